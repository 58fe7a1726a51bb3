// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Marketing-analytics destination seam (data sources, job history, bulk upload)
// role: destination/namespace
// inputs: DestinationClient implementation, report suite id, data source name
// outputs: Data source id lookup; job listings; upload responses
// invariants: The data source is matched by exact name; the first match wins
// errors: Unknown data source name is fatal; client errors propagate unchanged (no retry)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod analytics;
pub mod fixture;

use anyhow::{Result, bail};

use crate::model::{DataSource, JobRecord, UploadJob, UploadResponse};

/// Scope of a data source upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadRequest<'a> {
  pub report_suite_id: &'a str,
  pub data_source_id: &'a str,
  pub job: &'a UploadJob,
}

// --- Trait seam for the destination API ---
pub trait DestinationClient {
  fn list_data_sources(&self, report_suite_id: &str) -> Result<Vec<DataSource>>;
  fn list_jobs(&self, report_suite_id: &str, data_source_id: &str) -> Result<Vec<JobRecord>>;
  fn upload(&self, request: &UploadRequest<'_>) -> Result<UploadResponse>;
}

pub fn resolve_data_source_id(client: &dyn DestinationClient, report_suite_id: &str, name: &str) -> Result<String> {
  let sources = client.list_data_sources(report_suite_id)?;

  match sources.into_iter().find(|ds| ds.name == name) {
    Some(ds) => {
      tracing::info!("Found Data Source ID: {}", ds.id);
      Ok(ds.id)
    }
    None => bail!(
      "Data Source {:?} not found in report suite {}. Please check your configured Data Source name.",
      name,
      report_suite_id
    ),
  }
}

/// File name the data source lists for a received job: the job name lowercased,
/// then report suite, data source id and a sequence number.
pub fn stored_file_name(job_name: &str, report_suite_id: &str, data_source_id: &str, seq: usize) -> String {
  format!("{}_{}_{}_{}.tab", job_name.to_lowercase(), report_suite_id, data_source_id, seq)
}
