//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::ExportFixture;
//!
//! #[test]
//! fn example() {
//!     let fx = ExportFixture::new();
//!     fx.write_json("config.json", &serde_json::json!({}));
//!     fx.command().assert().failure();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

pub const BIN: &str = "gsc-aa-exporter";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// A temp directory laid out for an offline export run.
///
/// The exporter reads `config.json` from here and, with `--fixtures`, its
/// source rows (`source_rows.json`), data sources (`data_sources.json`) and
/// job history (`jobs.json`); uploads land in `uploads.jsonl`.
pub struct ExportFixture {
    dir: tempfile::TempDir,
}

impl Default for ExportFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportFixture {
    pub fn new() -> Self {
        Self { dir: tempdir() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.json")
    }

    pub fn write_text(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, text)
            .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
        path
    }

    /// `gsc-aa-exporter --config <dir>/config.json --fixtures <dir>`
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cmd_bin(BIN);
        cmd.arg("--config")
            .arg(self.config_path())
            .arg("--fixtures")
            .arg(self.path());
        cmd
    }

    pub fn has_uploads(&self) -> bool {
        self.path().join("uploads.jsonl").exists()
    }
}

#[cfg(feature = "serde")]
impl ExportFixture {
    pub fn write_json(&self, name: &str, value: &serde_json::Value) -> PathBuf {
        self.write_text(name, &serde_json::to_string_pretty(value).expect("serialize fixture"))
    }

    /// Every upload body the run submitted, in order (empty when nothing was uploaded).
    pub fn read_uploads(&self) -> Vec<serde_json::Value> {
        let path = self.path().join("uploads.jsonl");
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("upload line is JSON"))
            .collect()
    }
}
