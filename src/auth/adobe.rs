// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Obtain an Adobe IMS access token (client credentials) and discover the global company id
// role: auth/adobe
// inputs: AdobeCredentials (apiKey, client_secret, scopes)
// outputs: AdobeSession
// side_effects: POST to the IMS token endpoint; GET the Analytics discovery endpoint
// invariants: The first company of the first IMS org is used
// errors: Missing credentials, HTTP failures and absent JSON fields are fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};

use super::post_form;
use crate::config::AdobeCredentials;
use crate::ext::serde_json::JsonFetch;

pub const IMS_TOKEN_URL: &str = "https://ims-na1.adobelogin.com/ims/token/v3";
pub const DISCOVERY_URL: &str = "https://analytics.adobe.io/discovery/me";
pub const DEFAULT_SCOPES: &str = "openid,AdobeID,read_organizations,additional_info.projectedProductContext";

/// Everything the Analytics admin API needs on each call.
#[derive(Clone, Debug)]
pub struct AdobeSession {
  pub api_key: String,
  pub access_token: String,
  pub global_company_id: String,
}

pub struct AdobeEndpoints {
  pub token_url: String,
  pub discovery_url: String,
}

impl Default for AdobeEndpoints {
  fn default() -> Self {
    Self {
      token_url: IMS_TOKEN_URL.to_string(),
      discovery_url: DISCOVERY_URL.to_string(),
    }
  }
}

pub fn authenticate(creds: &AdobeCredentials) -> Result<AdobeSession> {
  authenticate_with(creds, &AdobeEndpoints::default())
}

pub fn authenticate_with(creds: &AdobeCredentials, endpoints: &AdobeEndpoints) -> Result<AdobeSession> {
  let (Some(api_key), Some(client_secret)) = (creds.api_key.as_deref(), creds.client_secret.as_deref()) else {
    bail!("Missing Adobe credentials: set `apiKey` and `client_secret` in the config file");
  };
  let scopes = creds.scopes.as_deref().unwrap_or(DEFAULT_SCOPES);
  let agent: ureq::Agent = ureq::Agent::config_builder().build().into();

  let grant = post_form(
    &agent,
    &endpoints.token_url,
    &[
      ("grant_type", "client_credentials"),
      ("client_id", api_key),
      ("client_secret", client_secret),
      ("scope", scopes),
    ],
  )?;
  let Some(access_token) = grant.fetch("access_token").to::<String>() else {
    bail!("Adobe token response has no access_token");
  };

  let mut resp = agent
    .get(&endpoints.discovery_url)
    .header("Authorization", &format!("Bearer {}", access_token))
    .header("x-api-key", api_key)
    .call()
    .context("calling Adobe discovery endpoint")?;
  let me = resp
    .body_mut()
    .read_json::<serde_json::Value>()
    .context("decoding Adobe discovery response")?;

  let Some(global_company_id) = me.fetch("imsOrgs.0.companies.0.globalCompanyId").to::<String>() else {
    bail!("No Analytics company is available to these Adobe credentials");
  };
  tracing::debug!("Using Adobe global company id {}", global_company_id);

  Ok(AdobeSession {
    api_key: api_key.to_string(),
    access_token,
    global_company_id,
  })
}
