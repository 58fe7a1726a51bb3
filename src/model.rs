// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the records exchanged with Search Console and Analytics, plus the run summary printed at the end
// role: model/types
// outputs: Serializable structs with stable field names matching the remote wire formats
// invariants: Wire names follow the remote APIs (fileName, keys, ...); metric counts are whole numbers
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Deserializer, Serialize};

/// Query dimension understood by the Search Console query endpoint.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
  Date,
  Page,
  Query,
}

/// One result row of a Search Console query.
///
/// `keys` follows the requested dimension order; the first key is always the
/// query date (`YYYY-MM-DD`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawMetricRow {
  pub keys: Vec<String>,
  #[serde(default, deserialize_with = "count_from_number")]
  pub clicks: u64,
  #[serde(default, deserialize_with = "count_from_number")]
  pub impressions: u64,
  #[serde(default)]
  pub position: f64,
  #[serde(default)]
  pub ctr: f64,
}

/// Flat row in destination column order.
pub type DestinationRow = Vec<String>;

/// One named bulk submission to the data source.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadJob {
  pub job_name: String,
  pub columns: Vec<String>,
  pub rows: Vec<DestinationRow>,
  pub finished: bool,
}

/// Data source entry as returned by `DataSources.Get`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataSource {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  pub name: String,
}

/// Job entry as returned by `DataSources.GetJobs`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobRecord {
  #[serde(rename = "fileName")]
  pub file_name: String,
  #[serde(default)]
  pub status: String,
}

/// Raw outcome of an upload call; no success field is defined by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
  pub status: u16,
  pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaySummary {
  pub date: String,
  pub rows: usize,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub jobs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunSummary {
  pub mode: String,
  pub dry_run: bool,
  pub data_source_id: String,
  pub dates_planned: usize,
  pub dates_skipped: Vec<String>,
  pub days: Vec<DaySummary>,
}

// Search Console reports counts as JSON numbers which may carry a fractional part ("3.0").
fn count_from_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let v = f64::deserialize(deserializer)?;

  if v < 0.0 || !v.is_finite() {
    return Err(serde::de::Error::custom(format!("invalid count: {v}")));
  }

  Ok(v.round() as u64)
}

// The 1.4 admin API is inconsistent about numeric vs string ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match serde_json::Value::deserialize(deserializer)? {
    serde_json::Value::String(s) => Ok(s),
    serde_json::Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!("expected id, got {other}"))),
  }
}
