// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one export run: plan dates, drop imported ones, then fetch, transform and upload day by day
// role: processing/orchestrator
// inputs: RunConfig, RunLayout, SourceClient, DestinationClient, today
// outputs: RunSummary (per-day row counts and job names)
// side_effects: Source queries; destination listing and uploads (none of the latter on dry-run)
// invariants:
// - The data source id is resolved once, before any date is fetched
// - Dates are processed strictly in work-list order, one at a time
// - A day with zero rows produces no job and no upload
// errors: The first failing stage aborts the run; earlier days stay submitted
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::RunConfig;
use crate::dates::DateWorkList;
use crate::destination::{DestinationClient, resolve_data_source_id};
use crate::imported::{AlreadyImportedFilter, JobNamePatternFilter};
use crate::layout::RunLayout;
use crate::model::{DaySummary, RunSummary};
use crate::source::{SourceClient, fetch_day};
use crate::transform::transform_rows;
use crate::upload::{UploadTarget, job_base_name, plan_jobs, upload_day};

pub fn run(
  cfg: &RunConfig,
  layout: &RunLayout,
  source: &dyn SourceClient,
  destination: &dyn DestinationClient,
  today: NaiveDate,
) -> Result<RunSummary> {
  tracing::info!("Operating mode: {}", layout.mode.name());

  let mut work = DateWorkList::plan(&cfg.dates, today);
  let dates_planned = work.len();

  let data_source_id = resolve_data_source_id(destination, &cfg.report_suite_id, &cfg.data_source_name)?;
  tracing::info!("Using Data Source {:?} (id {})", cfg.data_source_name, data_source_id);

  let filter = JobNamePatternFilter::new(&cfg.job_prefix, layout.mode, &cfg.report_suite_id, &data_source_id)?;
  let dates_skipped = filter.apply(destination, &mut work)?;

  tracing::info!("Number of days to fetch: {}", work.len());

  let target = UploadTarget {
    destination,
    report_suite_id: &cfg.report_suite_id,
    data_source_id: &data_source_id,
    dry_run: cfg.dry_run,
  };
  let headers = layout.headers();
  let total = work.len();
  let mut days: Vec<DaySummary> = Vec::with_capacity(total);

  for (i, date) in work.iter().enumerate() {
    tracing::info!("Fetching {} data for {} (Query {}/{})", layout.mode.name(), date, i + 1, total);

    let raw = fetch_day(source, date, layout.dimensions(), cfg.max_rows_per_day)
      .with_context(|| format!("fetching search metrics for {}", date))?;

    if raw.is_empty() {
      tracing::info!("No data for {}", date);
      days.push(DaySummary {
        date: date.to_string(),
        rows: 0,
        jobs: Vec::new(),
      });
      continue;
    }

    let rows = transform_rows(layout, &raw).with_context(|| format!("transforming rows for {}", date))?;
    let jobs = plan_jobs(
      &job_base_name(&cfg.job_prefix, layout.mode, date),
      &headers,
      &rows,
      cfg.batch_size,
    );
    let job_names = upload_day(&target, &jobs).with_context(|| format!("uploading {}", date))?;

    days.push(DaySummary {
      date: date.to_string(),
      rows: rows.len(),
      jobs: job_names,
    });
  }

  tracing::info!("Done: {} day(s) processed, {} skipped as already imported", days.len(), dates_skipped.len());

  Ok(RunSummary {
    mode: layout.mode.name().to_string(),
    dry_run: cfg.dry_run,
    data_source_id,
    dates_planned,
    dates_skipped,
    days,
  })
}
