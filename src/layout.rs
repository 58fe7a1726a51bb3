// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the operating mode, query dimensions and destination column schema from a RunConfig
// role: config/resolution
// inputs: RunConfig (event and eVar identifiers)
// outputs: RunLayout { mode, dimensions, columns }; each Column renders both its header and its row value
// invariants:
// - Mode priority: url+keyword > keyword > url > metrics only
// - Column order: Date, type label, URL, keyword, clicks, impressions, position, ctr
// - Headers and row values come from the same Column list, so their lengths always match
// errors: Fails when no metric event is configured
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::RunConfig;
use crate::model::{Dimension, RawMetricRow};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum OperatingMode {
  MetricsOnly,
  UrlOnly,
  KeywordOnly,
  UrlAndKeyword,
}

impl OperatingMode {
  pub fn select(has_url: bool, has_keyword: bool) -> Self {
    match (has_url, has_keyword) {
      (true, true) => OperatingMode::UrlAndKeyword,
      (_, true) => OperatingMode::KeywordOnly,
      (true, _) => OperatingMode::UrlOnly,
      _ => OperatingMode::MetricsOnly,
    }
  }

  /// Human name used in job names and the type label.
  pub fn name(self) -> &'static str {
    match self {
      OperatingMode::MetricsOnly => "Metrics Only",
      OperatingMode::UrlOnly => "URL Only",
      OperatingMode::KeywordOnly => "Keyword Only",
      OperatingMode::UrlAndKeyword => "URL and Keyword",
    }
  }

  pub fn dimensions(self) -> &'static [Dimension] {
    match self {
      OperatingMode::MetricsOnly => &[Dimension::Date],
      OperatingMode::UrlOnly => &[Dimension::Date, Dimension::Page],
      OperatingMode::KeywordOnly => &[Dimension::Date, Dimension::Query],
      OperatingMode::UrlAndKeyword => &[Dimension::Date, Dimension::Page, Dimension::Query],
    }
  }

  pub fn includes(self, dimension: Dimension) -> bool {
    self.dimensions().contains(&dimension)
  }

  fn key_index(self, dimension: Dimension) -> Option<usize> {
    self.dimensions().iter().position(|d| *d == dimension)
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Metric {
  Clicks,
  Impressions,
  Position,
  Ctr,
}

impl Metric {
  pub const ALL: [Metric; 4] = [Metric::Clicks, Metric::Impressions, Metric::Position, Metric::Ctr];

  fn render(self, row: &RawMetricRow) -> String {
    match self {
      Metric::Clicks => row.clicks.to_string(),
      Metric::Impressions => row.impressions.to_string(),
      Metric::Position => format_float(row.position),
      Metric::Ctr => format_float(row.ctr),
    }
  }
}

/// Float text in the form Adobe import files have always carried: `1.0`, `0.0353`, `1e-05`, `1e+16`.
pub fn format_float(v: f64) -> String {
  if v.is_nan() {
    return "nan".to_string();
  }
  if v.is_infinite() {
    return if v > 0.0 { "inf" } else { "-inf" }.to_string();
  }
  let abs = v.abs();
  if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
    let sci = format!("{:e}", v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    return format!("{}e{}{:02}", mantissa, sign, exp.abs());
  }
  let s = v.to_string();
  if s.contains('.') { s } else { format!("{}.0", s) }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ColumnKind {
  Date,
  TypeLabel,
  Dimension(Dimension),
  Metric(Metric),
}

/// One destination column: its header text and how to fill it from a source row.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Column {
  pub kind: ColumnKind,
  pub header: String,
}

impl Column {
  pub fn value(&self, mode: OperatingMode, row: &RawMetricRow) -> Result<String> {
    match &self.kind {
      ColumnKind::Date => {
        let raw = row.keys.first().context("result row has no date key")?;
        format_destination_date(raw)
      }
      ColumnKind::TypeLabel => Ok(format!("Import Type: {}", mode.name())),
      ColumnKind::Dimension(d) => {
        let idx = mode
          .key_index(*d)
          .with_context(|| format!("{:?} is not queried in mode {}", d, mode.name()))?;
        row
          .keys
          .get(idx)
          .cloned()
          .with_context(|| format!("result row is missing key #{} ({:?})", idx, d))
      }
      ColumnKind::Metric(m) => Ok(m.render(row)),
    }
  }
}

/// `YYYY-MM-DD` → `MM/DD/YYYY/00/00/00`.
pub fn format_destination_date(raw: &str) -> Result<String> {
  let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("unexpected date key {:?}", raw))?;
  Ok(date.format("%m/%d/%Y/00/00/00").to_string())
}

#[derive(Clone, Debug)]
pub struct RunLayout {
  pub mode: OperatingMode,
  pub columns: Vec<Column>,
}

impl RunLayout {
  pub fn dimensions(&self) -> &'static [Dimension] {
    self.mode.dimensions()
  }

  pub fn headers(&self) -> Vec<String> {
    self.columns.iter().map(|c| c.header.clone()).collect()
  }
}

pub fn resolve(cfg: &RunConfig) -> Result<RunLayout> {
  if cfg.events.is_empty() {
    bail!("No metric events configured (clicks_event, impressions_event, position_event, ctr_event). Aborting");
  }

  let mode = OperatingMode::select(cfg.url_evar.is_some(), cfg.keyword_evar.is_some());

  let mut columns = vec![Column {
    kind: ColumnKind::Date,
    header: "Date".into(),
  }];

  if let Some(t) = &cfg.type_evar {
    columns.push(Column {
      kind: ColumnKind::TypeLabel,
      header: format!("Evar {}", t),
    });
  }

  let dimension_evars = [(Dimension::Page, &cfg.url_evar), (Dimension::Query, &cfg.keyword_evar)];

  for (dimension, evar) in dimension_evars {
    if let Some(id) = evar {
      if mode.includes(dimension) {
        columns.push(Column {
          kind: ColumnKind::Dimension(dimension),
          header: format!("Evar {}", id),
        });
      }
    }
  }

  for metric in Metric::ALL {
    if let Some(id) = cfg.events.get(metric) {
      columns.push(Column {
        kind: ColumnKind::Metric(metric),
        header: format!("Event {}", id),
      });
    }
  }

  Ok(RunLayout { mode, columns })
}
