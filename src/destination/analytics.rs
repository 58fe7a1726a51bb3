// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Analytics 1.4 admin API client (DataSources.Get / GetJobs / UploadData)
// role: destination/http
// inputs: AdobeSession (api key, bearer token, global company id)
// outputs: DataSource and JobRecord lists; raw upload responses
// side_effects: Network calls to api.omniture.com
// invariants: Every call carries Authorization, x-api-key and x-proxy-global-company-id
// errors: Transport and HTTP status errors surface with the method name in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{DestinationClient, UploadRequest};
use crate::auth::adobe::AdobeSession;
use crate::model::{DataSource, JobRecord, UploadResponse};

const API_BASE: &str = "https://api.omniture.com/admin/1.4/rest/";

pub struct AnalyticsClient {
  agent: ureq::Agent,
  session: AdobeSession,
  base_url: String,
}

impl AnalyticsClient {
  pub fn new(session: AdobeSession) -> Self {
    Self {
      agent: ureq::Agent::config_builder().build().into(),
      session,
      base_url: API_BASE.to_string(),
    }
  }

  #[cfg(test)]
  fn with_base_url(mut self, base_url: &str) -> Self {
    self.base_url = base_url.to_string();
    self
  }

  fn call(&self, method: &str, body: &serde_json::Value) -> Result<ureq::http::Response<ureq::Body>> {
    self
      .agent
      .post(&self.base_url)
      .query("method", method)
      .header("Authorization", &format!("Bearer {}", self.session.access_token))
      .header("x-api-key", &self.session.api_key)
      .header("x-proxy-global-company-id", &self.session.global_company_id)
      .send_json(body)
      .with_context(|| format!("calling Analytics {}", method))
  }

  fn call_json<T: DeserializeOwned>(&self, method: &str, body: &serde_json::Value) -> Result<T> {
    let mut resp = self.call(method, body)?;
    resp
      .body_mut()
      .read_json::<T>()
      .with_context(|| format!("decoding Analytics {} response", method))
  }
}

pub fn upload_body(request: &UploadRequest<'_>) -> serde_json::Value {
  serde_json::json!({
    "columns": request.job.columns,
    "reportSuiteID": request.report_suite_id,
    "dataSourceID": request.data_source_id,
    "finished": request.job.finished,
    "jobName": request.job.job_name,
    "rows": request.job.rows,
  })
}

impl DestinationClient for AnalyticsClient {
  fn list_data_sources(&self, report_suite_id: &str) -> Result<Vec<DataSource>> {
    self.call_json(
      "DataSources.Get",
      &serde_json::json!({ "reportSuiteID": report_suite_id }),
    )
  }

  fn list_jobs(&self, report_suite_id: &str, data_source_id: &str) -> Result<Vec<JobRecord>> {
    self.call_json(
      "DataSources.GetJobs",
      &serde_json::json!({ "reportSuiteID": report_suite_id, "dataSourceID": data_source_id }),
    )
  }

  fn upload(&self, request: &UploadRequest<'_>) -> Result<UploadResponse> {
    let mut resp = self.call("DataSources.UploadData", &upload_body(request))?;
    let status = resp.status().as_u16();
    let body = resp
      .body_mut()
      .read_to_string()
      .context("reading Analytics DataSources.UploadData response")?;

    Ok(UploadResponse { status, body })
  }
}
