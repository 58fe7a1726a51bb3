// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Credential acquisition for both ends of the export (Google OAuth user token, Adobe IMS service token)
// role: auth
// outputs: Bearer tokens and the Adobe session used by the Analytics client
// side_effects: Network calls to token endpoints; reads/writes the Google token cache file
// errors: Propagated with the endpoint in context; authentication failures are fatal for the run
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod adobe;
pub mod google;

use anyhow::{Context, Result};

/// POST an `application/x-www-form-urlencoded` body and decode the JSON reply.
pub(crate) fn post_form(agent: &ureq::Agent, url: &str, form: &[(&str, &str)]) -> Result<serde_json::Value> {
  let mut resp = agent
    .post(url)
    .send_form(form.iter().copied())
    .with_context(|| format!("requesting token from {}", url))?;

  resp
    .body_mut()
    .read_json::<serde_json::Value>()
    .with_context(|| format!("decoding token response from {}", url))
}
