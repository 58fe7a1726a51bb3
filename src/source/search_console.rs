// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Search Console searchAnalytics.query over HTTP
// role: source/http
// inputs: OAuth access token, property (site URL or sc-domain:...), SourceQuery
// outputs: RawMetricRow pages
// side_effects: Network calls to www.googleapis.com
// invariants: startDate == endDate == the queried day; missing "rows" means an empty page
// errors: Transport and HTTP status errors surface with the endpoint in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{SourceClient, SourceQuery};
use crate::model::RawMetricRow;
use crate::util::encode_component;

const API_BASE: &str = "https://www.googleapis.com/webmasters/v3";

#[derive(Debug, Deserialize, Default)]
struct QueryResponse {
  #[serde(default)]
  rows: Vec<RawMetricRow>,
}

pub struct SearchConsoleClient {
  agent: ureq::Agent,
  token: String,
  property: String,
  base_url: String,
}

impl SearchConsoleClient {
  pub fn new(token: String, property: String) -> Self {
    Self {
      agent: ureq::Agent::config_builder().build().into(),
      token,
      property,
      base_url: API_BASE.to_string(),
    }
  }

  #[cfg(test)]
  fn with_base_url(mut self, base_url: &str) -> Self {
    self.base_url = base_url.to_string();
    self
  }

  fn query_url(&self) -> String {
    format!(
      "{}/sites/{}/searchAnalytics/query",
      self.base_url,
      encode_component(&self.property)
    )
  }
}

fn request_body(query: &SourceQuery<'_>) -> serde_json::Value {
  serde_json::json!({
    "startDate": query.date,
    "endDate": query.date,
    "dimensions": query.dimensions,
    "rowLimit": query.row_limit,
    "startRow": query.start_row,
  })
}

impl SourceClient for SearchConsoleClient {
  fn query(&self, query: &SourceQuery<'_>) -> Result<Vec<RawMetricRow>> {
    let url = self.query_url();

    let mut resp = self
      .agent
      .post(&url)
      .header("Authorization", &format!("Bearer {}", self.token))
      .send_json(request_body(query))
      .with_context(|| format!("querying Search Console for {} ({})", query.date, url))?;

    let parsed: QueryResponse = resp
      .body_mut()
      .read_json()
      .with_context(|| format!("decoding Search Console response for {}", query.date))?;

    Ok(parsed.rows)
  }
}
