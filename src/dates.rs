// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build the ordered list of calendar dates to export and hold it as the run's work list
// role: planning/dates
// inputs: DateSelection (explicit range or lookback), "today" (overridable for tests)
// outputs: DateWorkList of YYYY-MM-DD strings
// invariants:
// - Explicit ranges are inclusive and ascending; lookbacks start at today and descend
// - At most MAX_RUN_DAYS dates are built (first N of the span, never more); truncation is logged
// - Lookbacks reaching past the earliest representable date stop there instead of overflowing
// - The work list is deduplicated, never reordered, and only shrinks by removal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::config::{DateSelection, parse_ymd};

/// Ceiling on days per run; bounds run time and the number of jobs created.
pub const MAX_RUN_DAYS: usize = 90;

/// Number of dates `selection` describes before any cap.
pub fn span_days(selection: &DateSelection) -> u64 {
  match selection {
    DateSelection::Range { start, end } => u64::try_from((*end - *start).num_days() + 1).unwrap_or(0),
    DateSelection::Lookback { days } => u64::from(*days),
  }
}

fn describe_span(selection: &DateSelection, today: NaiveDate) -> String {
  match selection {
    DateSelection::Range { start, end } => format!("{}..{}", start, end),
    DateSelection::Lookback { days } => match today.checked_sub_signed(Duration::days(i64::from(*days) - 1)) {
      Some(earliest) => format!("{}..{}", today, earliest),
      None => format!("{} minus {} days", today, days),
    },
  }
}

/// Build at most `max_days` dates lazily; the cap never materializes the full span.
pub fn build_dates(selection: &DateSelection, today: NaiveDate, max_days: usize) -> Vec<NaiveDate> {
  let dates: Vec<NaiveDate> = match selection {
    DateSelection::Range { start, end } => start.iter_days().take_while(|d| d <= end).take(max_days).collect(),
    DateSelection::Lookback { days } => (0..i64::from(*days))
      .map_while(|x| today.checked_sub_signed(Duration::days(x)))
      .take(max_days)
      .collect(),
  };

  let total = span_days(selection);
  if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
    if total > dates.len() as u64 {
      tracing::warn!(
        "Date range of {} days exceeds the {}-day limit: {} truncated to {}..{}",
        total,
        max_days,
        describe_span(selection, today),
        first,
        last
      );
    }
  }

  dates
}

/// Parse a `--now-override` value (`YYYY-MM-DD`).
pub fn parse_today_override(s: Option<&str>) -> Result<Option<NaiveDate>> {
  s.map(|raw| parse_ymd(raw, "--now-override")).transpose()
}

/// Remaining dates to export, as `YYYY-MM-DD` strings.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DateWorkList {
  dates: Vec<String>,
}

impl DateWorkList {
  pub fn new(dates: &[NaiveDate]) -> Self {
    let mut out: Vec<String> = Vec::with_capacity(dates.len());

    for d in dates {
      let s = d.format("%Y-%m-%d").to_string();
      if !out.contains(&s) {
        out.push(s);
      }
    }

    Self { dates: out }
  }

  pub fn plan(selection: &DateSelection, today: NaiveDate) -> Self {
    Self::new(&build_dates(selection, today, MAX_RUN_DAYS))
  }

  pub fn contains(&self, date: &str) -> bool {
    self.dates.iter().any(|d| d == date)
  }

  /// Remove `date`; returns whether it was present.
  pub fn remove(&mut self, date: &str) -> bool {
    let before = self.dates.len();
    self.dates.retain(|d| d != date);
    self.dates.len() != before
  }

  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.dates.iter().map(String::as_str)
  }

  pub fn as_slice(&self) -> &[String] {
    &self.dates
  }
}
