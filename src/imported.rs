// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drop dates that an earlier run already imported, judged from the destination's job history
// role: planning/idempotency
// inputs: DestinationClient job list, job prefix, operating mode, report suite id, data source id
// outputs: Narrowed DateWorkList; list of removed dates
// invariants:
// - Candidate jobs contain the lowercased prefix (case-insensitive substring)
// - A job counts only when its filename matches the anchored pattern
//   <prefix>_<mode>_<YYYY-MM-DD>[_part<k>]_<reportSuite>_<dataSourceId>_<n>.tab and its status is not "failed"
// - Any successful part of a split day marks the whole day as imported
// - Filename match is heuristic: content and row counts are never verified
// errors: Job-list failures propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use regex::Regex;

use crate::dates::DateWorkList;
use crate::destination::DestinationClient;
use crate::layout::OperatingMode;
use crate::model::JobRecord;

// --- Trait seam for duplicate-import detection ---
pub trait AlreadyImportedFilter {
  /// Remove already-imported dates from `work`, returning them in removal order.
  fn apply(&self, destination: &dyn DestinationClient, work: &mut DateWorkList) -> Result<Vec<String>>;
}

pub struct JobNamePatternFilter {
  report_suite_id: String,
  data_source_id: String,
  prefix_lower: String,
  pattern: Regex,
}

impl JobNamePatternFilter {
  pub fn new(prefix: &str, mode: OperatingMode, report_suite_id: &str, data_source_id: &str) -> Result<Self> {
    let prefix_lower = prefix.to_lowercase();
    let source = format!(
      r"^{}_{}_([0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}})(?:_part[0-9]+)?_{}_{}_[0-9]*\.tab$",
      regex::escape(&prefix_lower),
      regex::escape(&mode.name().to_lowercase()),
      regex::escape(report_suite_id),
      regex::escape(data_source_id),
    );
    let pattern = Regex::new(&source).with_context(|| format!("compiling job name pattern {}", source))?;

    Ok(Self {
      report_suite_id: report_suite_id.to_string(),
      data_source_id: data_source_id.to_string(),
      prefix_lower,
      pattern,
    })
  }

  /// Date of a successfully imported job, if `job` is one of ours.
  pub fn imported_date(&self, job: &JobRecord) -> Option<String> {
    if !job.file_name.to_lowercase().contains(&self.prefix_lower) {
      return None;
    }

    if job.status.eq_ignore_ascii_case("failed") {
      return None;
    }

    self
      .pattern
      .captures(&job.file_name)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().to_string())
  }
}

impl AlreadyImportedFilter for JobNamePatternFilter {
  fn apply(&self, destination: &dyn DestinationClient, work: &mut DateWorkList) -> Result<Vec<String>> {
    let jobs = destination.list_jobs(&self.report_suite_id, &self.data_source_id)?;
    let mut removed: Vec<String> = Vec::new();

    for job in &jobs {
      let Some(date) = self.imported_date(job) else { continue };

      if work.remove(&date) {
        tracing::info!("Skipping {}: already imported as {}", date, job.file_name);
        removed.push(date);
      }
    }

    Ok(removed)
  }
}
