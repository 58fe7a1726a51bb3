// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Search-metrics source seam and the per-day paginated fetch
// role: source/namespace
// inputs: SourceClient implementation, date, query dimensions, per-day row cap
// outputs: Vec<RawMetricRow> for one day, never longer than the cap
// invariants:
// - Pages are requested with a fixed size of PAGE_SIZE and increasing start offsets
// - Paging stops on a short page or once the cap is reached; no extra query is issued
// - Zero rows for a day is a valid result
// errors: Client errors propagate unchanged (no retry)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod fixture;
pub mod search_console;

use anyhow::Result;

use crate::model::{Dimension, RawMetricRow};

pub const PAGE_SIZE: usize = 10_000;

/// One page request against the source for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuery<'a> {
  pub date: &'a str,
  pub dimensions: &'a [Dimension],
  pub row_limit: usize,
  pub start_row: usize,
}

// --- Trait seam for the search-metrics provider ---
pub trait SourceClient {
  fn query(&self, query: &SourceQuery<'_>) -> Result<Vec<RawMetricRow>>;
}

pub fn fetch_day(
  client: &dyn SourceClient,
  date: &str,
  dimensions: &[Dimension],
  max_rows: usize,
) -> Result<Vec<RawMetricRow>> {
  let mut rows: Vec<RawMetricRow> = Vec::new();
  let mut start_row = 0usize;

  loop {
    let page = client.query(&SourceQuery {
      date,
      dimensions,
      row_limit: PAGE_SIZE,
      start_row,
    })?;
    let fetched = page.len();
    rows.extend(page);

    tracing::info!("  Fetched {} rows (total: {})", fetched, rows.len());

    if fetched < PAGE_SIZE || rows.len() >= max_rows {
      break;
    }
    start_row += fetched;
  }

  if rows.len() >= max_rows {
    rows.truncate(max_rows);
    tracing::info!("  Capped at {} rows (max_rows_per_day)", max_rows);
  }

  Ok(rows)
}
