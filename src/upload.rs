// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Split one day's destination rows into named upload jobs and submit them (or preview on dry-run)
// role: output/upload
// inputs: DestinationClient, report suite id, data source id, job base name, headers, rows, batch size
// outputs: Submitted job names; dry-run preview on stderr (stdout stays JSON)
// side_effects: Upload calls; stderr preview when dry-run
// invariants:
// - Each job carries at most batch_size rows and finished=true
// - Job names get a 1-indexed _part<k> suffix only when a day needs more than one job
// - Dry-run never calls the destination
// errors: A failing upload propagates; already-submitted sibling jobs are left as they are
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;

use crate::destination::{DestinationClient, UploadRequest};
use crate::layout::OperatingMode;
use crate::model::{DestinationRow, UploadJob};

/// Rows shown in a dry-run preview.
pub const PREVIEW_SAMPLE_ROWS: usize = 5;

/// `<prefix>_<Mode Name>_<date>`
pub fn job_base_name(prefix: &str, mode: OperatingMode, date: &str) -> String {
  format!("{}_{}_{}", prefix, mode.name(), date)
}

pub fn plan_jobs(base_name: &str, columns: &[String], rows: &[DestinationRow], batch_size: usize) -> Vec<UploadJob> {
  let batch_size = batch_size.max(1);
  let batches: Vec<Vec<DestinationRow>> = rows.chunks(batch_size).map(|c| c.to_vec()).collect();
  let multi = batches.len() > 1;

  batches
    .into_iter()
    .enumerate()
    .map(|(i, batch)| UploadJob {
      job_name: if multi {
        format!("{}_part{}", base_name, i + 1)
      } else {
        base_name.to_string()
      },
      columns: columns.to_vec(),
      rows: batch,
      finished: true,
    })
    .collect()
}

pub fn render_preview(jobs: &[UploadJob]) -> String {
  let total: usize = jobs.iter().map(|j| j.rows.len()).sum();
  let columns = jobs.first().map(|j| j.columns.join(" | ")).unwrap_or_default();
  let mut out = String::new();

  out.push_str(&format!("[dry-run] Columns: {}\n", columns));
  out.push_str(&format!("[dry-run] Rows: {} in {} job(s)\n", total, jobs.len()));

  for job in jobs {
    out.push_str(&format!("[dry-run] Job: {} ({} rows)\n", job.job_name, job.rows.len()));
  }

  for row in jobs.iter().flat_map(|j| j.rows.iter()).take(PREVIEW_SAMPLE_ROWS) {
    out.push_str(&format!("[dry-run]   {}\n", row.join(" | ")));
  }

  out
}

pub struct UploadTarget<'a> {
  pub destination: &'a dyn DestinationClient,
  pub report_suite_id: &'a str,
  pub data_source_id: &'a str,
  pub dry_run: bool,
}

/// Submit (or preview) all jobs of one day; returns the job names.
pub fn upload_day(target: &UploadTarget<'_>, jobs: &[UploadJob]) -> Result<Vec<String>> {
  let names: Vec<String> = jobs.iter().map(|j| j.job_name.clone()).collect();

  if target.dry_run {
    eprint!("{}", render_preview(jobs));
    return Ok(names);
  }

  for job in jobs {
    let resp = target.destination.upload(&UploadRequest {
      report_suite_id: target.report_suite_id,
      data_source_id: target.data_source_id,
      job,
    })?;
    tracing::info!(
      "Submitted {} ({} rows): HTTP {} {}",
      job.job_name,
      job.rows.len(),
      resp.status,
      resp.body.trim()
    );
  }

  Ok(names)
}
