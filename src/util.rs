// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for "today" resolution, logging setup, URL component coding, and man page rendering
// role: utilities/helpers
// inputs: Optional date override; clap CommandFactory; raw strings
// outputs: Effective date, percent-encoded/decoded strings, man page text
// side_effects: init_tracing installs the global subscriber (stderr)
// invariants:
// - encode_component escapes everything except RFC 3986 unreserved characters
// - decode_component never panics on malformed escapes (they pass through)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{Local, NaiveDate};
use clap::CommandFactory;
use tracing_subscriber::{EnvFilter, fmt};

/// Returns the effective "today" given an optional override.
///
/// Centralizes our handling of test determinism without sprinkling
/// `Local::now()` throughout the code.
pub fn effective_today(override_today: Option<NaiveDate>) -> NaiveDate {
  override_today.unwrap_or_else(|| Local::now().date_naive())
}

/// Install the stderr subscriber; `RUST_LOG` wins over the `info` default.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .with_writer(std::io::stderr)
    .try_init();
}

/// Percent-encode a single URL path segment or query value.
pub fn encode_component(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());

  for b in raw.bytes() {
    match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(b as char),
      _ => out.push_str(&format!("%{:02X}", b)),
    }
  }

  out
}

/// Decode a query value (`+` is a space, `%XX` an escaped byte).
pub fn decode_component(raw: &str) -> String {
  let bytes = raw.as_bytes();
  let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'+' => {
        out.push(b' ');
        i += 1;
      }
      b'%' if i + 2 < bytes.len() => {
        let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
        match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
          Some(v) => {
            out.push(v);
            i += 3;
          }
          None => {
            out.push(b'%');
            i += 1;
          }
        }
      }
      other => {
        out.push(other);
        i += 1;
      }
    }
  }

  String::from_utf8_lossy(&out).to_string()
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
