// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Google OAuth access token for Search Console (read-only), cached in an authorized-user token file
// role: auth/google
// inputs: GoogleCredentialPaths (token cache file, client secrets file)
// outputs: Bearer access token
// side_effects: Token endpoint calls; rewrites the token file; binds 127.0.0.1:8085 for the consent redirect
// invariants:
// - A cached token that is present and not about to expire is used as-is
// - An expired token with a refresh_token is refreshed; otherwise the installed-app consent flow runs
// - The token file is rewritten after every refresh or new grant
// errors: Unreadable secrets, denied consent and token endpoint failures are fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::post_form;
use crate::config::GoogleCredentialPaths;
use crate::ext::serde_json::JsonFetch;
use crate::util::{decode_component, encode_component};

pub const SEARCH_CONSOLE_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const REDIRECT_PORT: u16 = 8085;

const EXPIRY_SKEW_SECS: i64 = 60;

fn default_token_uri() -> String {
  DEFAULT_TOKEN_URI.to_string()
}

/// Authorized-user token file, compatible with the layout Google's client libraries write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
  #[serde(default)]
  pub token: Option<String>,
  #[serde(default)]
  pub refresh_token: Option<String>,
  #[serde(default = "default_token_uri")]
  pub token_uri: String,
  pub client_id: String,
  pub client_secret: String,
  #[serde(default)]
  pub scopes: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expiry: Option<String>,
}

impl AuthorizedUser {
  pub fn load(path: &Path) -> Result<Option<Self>> {
    if !path.exists() {
      return Ok(None);
    }

    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let user = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    Ok(Some(user))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(self)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
  }

  fn expires_at(&self) -> Option<DateTime<Utc>> {
    self
      .expiry
      .as_deref()
      .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
      .map(|d| d.with_timezone(&Utc))
  }

  /// Token present and not within the expiry skew. No expiry means no known deadline.
  pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
    let has_token = self.token.as_deref().is_some_and(|t| !t.is_empty());

    match (&self.expiry, self.expires_at()) {
      (None, _) => has_token,
      (Some(_), Some(at)) => has_token && now + Duration::seconds(EXPIRY_SKEW_SECS) < at,
      (Some(_), None) => false,
    }
  }

  fn apply_grant(&mut self, grant: &serde_json::Value, now: DateTime<Utc>) -> Result<()> {
    let Some(token) = grant.fetch("access_token").to::<String>() else {
      bail!("Google token response has no access_token");
    };
    self.token = Some(token);

    let expires_in = grant.fetch("expires_in").to_or_default::<i64>();
    self.expiry = (expires_in > 0).then(|| {
      (now + Duration::seconds(expires_in))
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
    });

    if let Some(refresh) = grant.fetch("refresh_token").to::<String>() {
      self.refresh_token = Some(refresh);
    }

    Ok(())
  }
}

/// The `installed` (or `web`) section of a downloaded OAuth client secrets file.
#[derive(Debug, Clone)]
pub struct ClientSecrets {
  pub client_id: String,
  pub client_secret: String,
  pub auth_uri: String,
  pub token_uri: String,
}

impl ClientSecrets {
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading Google client secrets {}", path.display()))?;
    let doc: serde_json::Value =
      serde_json::from_str(&raw).with_context(|| format!("parsing Google client secrets {}", path.display()))?;

    for section in ["installed", "web"] {
      let client_id = doc.fetch(&format!("{}.client_id", section)).to::<String>();
      let client_secret = doc.fetch(&format!("{}.client_secret", section)).to::<String>();

      if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
        return Ok(Self {
          client_id,
          client_secret,
          auth_uri: doc
            .fetch(&format!("{}.auth_uri", section))
            .to::<String>()
            .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
          token_uri: doc
            .fetch(&format!("{}.token_uri", section))
            .to::<String>()
            .unwrap_or_else(default_token_uri),
        });
      }
    }

    bail!("{} has no installed or web OAuth client", path.display())
  }

  pub fn consent_url(&self, redirect_uri: &str) -> String {
    format!(
      "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline&prompt=consent",
      self.auth_uri,
      encode_component(&self.client_id),
      encode_component(redirect_uri),
      encode_component(SEARCH_CONSOLE_SCOPE),
    )
  }
}

/// Return a usable access token, refreshing or re-authorizing (and re-saving the cache) as needed.
pub fn access_token(paths: &GoogleCredentialPaths) -> Result<String> {
  let agent: ureq::Agent = ureq::Agent::config_builder().build().into();
  let now = Utc::now();

  let user = match AuthorizedUser::load(&paths.token_file)? {
    Some(user) if user.is_valid(now) => user,
    Some(mut user) if user.refresh_token.is_some() => {
      tracing::info!("Refreshing Google access token");
      refresh(&agent, &mut user, now)?;
      user.save(&paths.token_file)?;
      user
    }
    _ => {
      let secrets = ClientSecrets::load(&paths.client_secrets_file)?;
      let user = run_installed_flow(&agent, &secrets, now)?;
      user.save(&paths.token_file)?;
      user
    }
  };

  user.token.context("Google token file has no access token")
}

fn refresh(agent: &ureq::Agent, user: &mut AuthorizedUser, now: DateTime<Utc>) -> Result<()> {
  let refresh_token = user.refresh_token.clone().unwrap_or_default();
  let grant = post_form(
    agent,
    &user.token_uri,
    &[
      ("grant_type", "refresh_token"),
      ("refresh_token", refresh_token.as_str()),
      ("client_id", user.client_id.as_str()),
      ("client_secret", user.client_secret.as_str()),
    ],
  )?;

  user.apply_grant(&grant, now)
}

fn run_installed_flow(agent: &ureq::Agent, secrets: &ClientSecrets, now: DateTime<Utc>) -> Result<AuthorizedUser> {
  let redirect_uri = format!("http://localhost:{}/", REDIRECT_PORT);
  let listener = TcpListener::bind(("127.0.0.1", REDIRECT_PORT))
    .with_context(|| format!("binding 127.0.0.1:{} for the Google consent redirect", REDIRECT_PORT))?;

  tracing::info!(
    "Google authorization required. Open this URL in a browser:\n{}",
    secrets.consent_url(&redirect_uri)
  );

  let code = wait_for_code(&listener)?;
  exchange_code(agent, secrets, &code, &redirect_uri, now)
}

fn exchange_code(
  agent: &ureq::Agent,
  secrets: &ClientSecrets,
  code: &str,
  redirect_uri: &str,
  now: DateTime<Utc>,
) -> Result<AuthorizedUser> {
  let grant = post_form(
    agent,
    &secrets.token_uri,
    &[
      ("grant_type", "authorization_code"),
      ("code", code),
      ("client_id", secrets.client_id.as_str()),
      ("client_secret", secrets.client_secret.as_str()),
      ("redirect_uri", redirect_uri),
    ],
  )?;

  let mut user = AuthorizedUser {
    token: None,
    refresh_token: None,
    token_uri: secrets.token_uri.clone(),
    client_id: secrets.client_id.clone(),
    client_secret: secrets.client_secret.clone(),
    scopes: vec![SEARCH_CONSOLE_SCOPE.to_string()],
    expiry: None,
  };
  user.apply_grant(&grant, now)?;

  Ok(user)
}

static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]code=([^&\s]+)").unwrap());
static RE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]error=([^&\s]+)").unwrap());

/// Accept one browser redirect and pull the authorization code out of its request line.
fn wait_for_code(listener: &TcpListener) -> Result<String> {
  let (mut stream, _) = listener.accept().context("waiting for the Google consent redirect")?;
  let mut request_line = String::new();
  BufReader::new(stream.try_clone()?).read_line(&mut request_line)?;

  let code = RE_CODE.captures(&request_line).and_then(|c| c.get(1)).map(|m| decode_component(m.as_str()));
  let page = if code.is_some() {
    "The authentication flow has completed. You may close this window."
  } else {
    "Authorization failed. Check the terminal for details."
  };
  let _ = write!(
    stream,
    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    page.len(),
    page
  );

  match code {
    Some(c) => Ok(c),
    None => {
      let reason = RE_ERROR
        .captures(&request_line)
        .and_then(|c| c.get(1))
        .map(|m| decode_component(m.as_str()))
        .unwrap_or_else(|| "no code in redirect".to_string());
      bail!("Google authorization was not granted: {}", reason)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::test_http::serve_capture;
  use std::io::Read;
  use std::net::TcpStream;

  fn user(expiry: Option<&str>, token_uri: &str) -> AuthorizedUser {
    AuthorizedUser {
      token: Some("cached".into()),
      refresh_token: Some("r1".into()),
      token_uri: token_uri.into(),
      client_id: "cid".into(),
      client_secret: "csecret".into(),
      scopes: vec![SEARCH_CONSOLE_SCOPE.into()],
      expiry: expiry.map(String::from),
    }
  }

  fn paths(dir: &Path) -> GoogleCredentialPaths {
    GoogleCredentialPaths {
      token_file: dir.join("google_token.json"),
      client_secrets_file: dir.join("client_secret.json"),
    }
  }

  #[test]
  fn validity_respects_expiry_and_skew() {
    let now = DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z").unwrap().with_timezone(&Utc);
    assert!(user(Some("2024-06-01T13:00:00.000000Z"), "x").is_valid(now));
    assert!(!user(Some("2024-06-01T12:00:30Z"), "x").is_valid(now));
    assert!(!user(Some("not a date"), "x").is_valid(now));
    assert!(user(None, "x").is_valid(now));

    let mut empty = user(None, "x");
    empty.token = None;
    assert!(!empty.is_valid(now));
  }

  #[test]
  fn valid_cache_is_used_without_network() {
    let td = tempfile::TempDir::new().unwrap();
    let p = paths(td.path());
    user(Some("2999-01-01T00:00:00Z"), "http://127.0.0.1:9/unused")
      .save(&p.token_file)
      .unwrap();
    assert_eq!(access_token(&p).unwrap(), "cached");
  }

  #[test]
  fn expired_token_is_refreshed_and_saved() {
    let td = tempfile::TempDir::new().unwrap();
    let p = paths(td.path());
    let (base, rx) = serve_capture("HTTP/1.1 200 OK", r#"{"access_token":"fresh","expires_in":3599}"#);
    user(Some("2000-01-01T00:00:00Z"), &format!("{}/token", base)).save(&p.token_file).unwrap();

    assert_eq!(access_token(&p).unwrap(), "fresh");

    let (_, form) = rx.recv().unwrap();
    assert!(form.contains("grant_type=refresh_token"), "form: {}", form);
    assert!(form.contains("refresh_token=r1"));

    let saved = AuthorizedUser::load(&p.token_file).unwrap().unwrap();
    assert_eq!(saved.token.as_deref(), Some("fresh"));
    assert_eq!(saved.refresh_token.as_deref(), Some("r1"));
    assert!(saved.is_valid(Utc::now()));
  }

  #[test]
  fn client_secrets_prefer_installed_section() {
    let td = tempfile::TempDir::new().unwrap();
    let path = td.path().join("client_secret.json");
    std::fs::write(
      &path,
      serde_json::json!({"installed": {"client_id": "abc.apps", "client_secret": "shh"}}).to_string(),
    )
    .unwrap();
    let s = ClientSecrets::load(&path).unwrap();
    assert_eq!(s.client_id, "abc.apps");
    assert_eq!(s.token_uri, DEFAULT_TOKEN_URI);

    let url = s.consent_url("http://localhost:8085/");
    assert!(url.starts_with(DEFAULT_AUTH_URI));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8085%2F"));
    assert!(url.contains("webmasters.readonly"));
  }

  #[test]
  fn client_secrets_without_client_is_an_error() {
    let td = tempfile::TempDir::new().unwrap();
    let path = td.path().join("client_secret.json");
    std::fs::write(&path, "{}").unwrap();
    assert!(ClientSecrets::load(&path).is_err());
  }

  fn redirect(listener: &TcpListener, path: &'static str) -> std::thread::JoinHandle<String> {
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
      let mut s = TcpStream::connect(addr).unwrap();
      write!(s, "GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path).unwrap();
      let mut out = String::new();
      let _ = s.read_to_string(&mut out);
      out
    })
  }

  #[test]
  fn redirect_code_is_decoded() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let browser = redirect(&listener, "/?state=s&code=4%2F0Abc&scope=x");
    assert_eq!(wait_for_code(&listener).unwrap(), "4/0Abc");
    assert!(browser.join().unwrap().contains("completed"));
  }

  #[test]
  fn denied_consent_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let browser = redirect(&listener, "/?error=access_denied");
    let err = wait_for_code(&listener).unwrap_err();
    assert!(err.to_string().contains("access_denied"));
    browser.join().unwrap();
  }

  #[test]
  fn code_exchange_builds_authorized_user() {
    let (base, rx) = serve_capture(
      "HTTP/1.1 200 OK",
      r#"{"access_token":"new","refresh_token":"r2","expires_in":3599}"#,
    );
    let secrets = ClientSecrets {
      client_id: "cid".into(),
      client_secret: "csecret".into(),
      auth_uri: DEFAULT_AUTH_URI.into(),
      token_uri: format!("{}/token", base),
    };
    let agent: ureq::Agent = ureq::Agent::config_builder().build().into();
    let u = exchange_code(&agent, &secrets, "4/0Abc", "http://localhost:8085/", Utc::now()).unwrap();
    assert_eq!(u.token.as_deref(), Some("new"));
    assert_eq!(u.refresh_token.as_deref(), Some("r2"));

    let (_, form) = rx.recv().unwrap();
    assert!(form.contains("grant_type=authorization_code"));
    assert!(form.contains("code=4%2F0Abc"));
  }
}
