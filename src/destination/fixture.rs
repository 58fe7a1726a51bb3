// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: File-backed DestinationClient for offline runs (hidden --fixtures flag; integration tests)
// role: destination/fixture
// inputs: <dir>/data_sources.json ([DataSource]); <dir>/jobs.json ([JobRecord], optional)
// outputs: Each upload appended as one JSON line to <dir>/uploads.jsonl and recorded as a successful job in jobs.json
// side_effects: Appends to uploads.jsonl; rewrites jobs.json
// invariants: Missing jobs.json means an empty job history
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{DestinationClient, UploadRequest, stored_file_name};
use crate::model::{DataSource, JobRecord, UploadResponse};

pub const DATA_SOURCES_FILE: &str = "data_sources.json";
pub const JOBS_FILE: &str = "jobs.json";
pub const UPLOADS_FILE: &str = "uploads.jsonl";

pub struct FixtureDestination {
  dir: PathBuf,
}

impl FixtureDestination {
  pub fn new(dir: &Path) -> Self {
    Self { dir: dir.to_path_buf() }
  }

  fn read_list<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
    let path = self.dir.join(name);

    if !path.exists() {
      return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
  }
}

impl DestinationClient for FixtureDestination {
  fn list_data_sources(&self, _report_suite_id: &str) -> Result<Vec<DataSource>> {
    self.read_list(DATA_SOURCES_FILE)
  }

  fn list_jobs(&self, _report_suite_id: &str, _data_source_id: &str) -> Result<Vec<JobRecord>> {
    self.read_list(JOBS_FILE)
  }

  fn upload(&self, request: &UploadRequest<'_>) -> Result<UploadResponse> {
    let path = self.dir.join(UPLOADS_FILE);
    let line = serde_json::to_string(&super::analytics::upload_body(request))?;

    let mut file = std::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .with_context(|| format!("opening {}", path.display()))?;
    writeln!(file, "{}", line).with_context(|| format!("writing {}", path.display()))?;

    let mut jobs: Vec<JobRecord> = self.read_list(JOBS_FILE)?;
    jobs.push(JobRecord {
      file_name: stored_file_name(
        &request.job.job_name,
        request.report_suite_id,
        request.data_source_id,
        jobs.len(),
      ),
      status: "success".into(),
    });
    let jobs_path = self.dir.join(JOBS_FILE);
    std::fs::write(&jobs_path, serde_json::to_string_pretty(&jobs)?)
      .with_context(|| format!("writing {}", jobs_path.display()))?;

    Ok(UploadResponse {
      status: 200,
      body: "true".into(),
    })
  }
}
