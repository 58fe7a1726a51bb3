// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the JSON configuration file and validate it into one immutable RunConfig
// role: config/loading
// inputs: config.json path; CLI overrides applied by cli::normalize
// outputs: FileConfig (raw, all optional) and RunConfig (validated)
// invariants:
// - Empty strings are treated as "not configured" for every identifier
// - start_date/end_date are either both present or both absent
// - max_rows_per_day and batch_size are >= 1
// errors: IO/parse errors carry the file path; validation errors name the offending key
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::layout::Metric;

pub const DEFAULT_MAX_ROWS_PER_DAY: usize = 50_000;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_GOOGLE_TOKEN_FILE: &str = "google_token.json";
pub const DEFAULT_GOOGLE_CLIENT_SECRETS_FILE: &str = "client_secret.json";

/// On-disk configuration, exactly as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub lookback_days: Option<u32>,

  pub clicks_event: Option<String>,
  pub impressions_event: Option<String>,
  pub position_event: Option<String>,
  pub ctr_event: Option<String>,

  pub url_evar: Option<String>,
  pub keyword_evar: Option<String>,
  pub type_evar: Option<String>,

  pub report_suite_id: Option<String>,
  pub data_source_name: Option<String>,
  pub job_prefix: Option<String>,
  pub max_rows_per_day: Option<usize>,
  pub batch_size: Option<usize>,
  #[serde(default)]
  pub dry_run: bool,

  pub google_property: Option<String>,
  pub google_token_file: Option<PathBuf>,
  pub google_client_secrets_file: Option<PathBuf>,

  #[serde(rename = "apiKey")]
  pub api_key: Option<String>,
  pub client_secret: Option<String>,
  pub scopes: Option<String>,
}

impl FileConfig {
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
  }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DateSelection {
  Range { start: NaiveDate, end: NaiveDate },
  Lookback { days: u32 },
}

/// Destination event slot per metric; `None` means the metric is not exported.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct MetricEvents {
  pub clicks: Option<String>,
  pub impressions: Option<String>,
  pub position: Option<String>,
  pub ctr: Option<String>,
}

impl MetricEvents {
  pub fn get(&self, metric: Metric) -> Option<&str> {
    let slot = match metric {
      Metric::Clicks => &self.clicks,
      Metric::Impressions => &self.impressions,
      Metric::Position => &self.position,
      Metric::Ctr => &self.ctr,
    };
    slot.as_deref()
  }

  pub fn is_empty(&self) -> bool {
    Metric::ALL.iter().all(|m| self.get(*m).is_none())
  }
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct AdobeCredentials {
  pub api_key: Option<String>,
  pub client_secret: Option<String>,
  pub scopes: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GoogleCredentialPaths {
  pub token_file: PathBuf,
  pub client_secrets_file: PathBuf,
}

/// Immutable parameters of a single run, passed explicitly to every stage.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RunConfig {
  pub dates: DateSelection,
  pub events: MetricEvents,
  pub url_evar: Option<String>,
  pub keyword_evar: Option<String>,
  pub type_evar: Option<String>,
  pub report_suite_id: String,
  pub data_source_name: String,
  pub job_prefix: String,
  pub max_rows_per_day: usize,
  pub batch_size: usize,
  pub dry_run: bool,
  pub google_property: String,
  pub google: GoogleCredentialPaths,
  pub adobe: AdobeCredentials,
}

fn present(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn required(v: Option<String>, key: &str) -> Result<String> {
  match present(v) {
    Some(s) => Ok(s),
    None => bail!("Missing required config key `{}`", key),
  }
}

pub fn parse_ymd(raw: &str, key: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("`{}` must be YYYY-MM-DD, got {:?}", key, raw))
}

fn date_selection(file: &FileConfig) -> Result<DateSelection> {
  let start = present(file.start_date.clone());
  let end = present(file.end_date.clone());

  match (start, end) {
    (Some(s), Some(e)) => {
      let start = parse_ymd(&s, "start_date")?;
      let end = parse_ymd(&e, "end_date")?;

      if start > end {
        bail!("start_date {} is after end_date {}", start, end);
      }
      Ok(DateSelection::Range { start, end })
    }
    (None, None) => match file.lookback_days {
      Some(days) if days >= 1 => Ok(DateSelection::Lookback { days }),
      Some(_) => bail!("lookback_days must be at least 1"),
      None => bail!("Provide either start_date AND end_date, or lookback_days"),
    },
    _ => bail!("start_date and end_date must be given together"),
  }
}

impl RunConfig {
  /// Validate a file configuration (with CLI overrides already merged in).
  ///
  /// The metric-event check lives in `layout::resolve`, which runs before any network call.
  pub fn from_file(file: FileConfig) -> Result<Self> {
    let dates = date_selection(&file)?;

    let max_rows_per_day = file.max_rows_per_day.unwrap_or(DEFAULT_MAX_ROWS_PER_DAY);
    if max_rows_per_day == 0 {
      bail!("max_rows_per_day must be at least 1");
    }

    let batch_size = file.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
      bail!("batch_size must be at least 1");
    }

    Ok(RunConfig {
      dates,
      events: MetricEvents {
        clicks: present(file.clicks_event),
        impressions: present(file.impressions_event),
        position: present(file.position_event),
        ctr: present(file.ctr_event),
      },
      url_evar: present(file.url_evar),
      keyword_evar: present(file.keyword_evar),
      type_evar: present(file.type_evar),
      report_suite_id: required(file.report_suite_id, "report_suite_id")?,
      data_source_name: required(file.data_source_name, "data_source_name")?,
      job_prefix: required(file.job_prefix, "job_prefix")?,
      max_rows_per_day,
      batch_size,
      dry_run: file.dry_run,
      google_property: required(file.google_property, "google_property")?,
      google: GoogleCredentialPaths {
        token_file: file
          .google_token_file
          .unwrap_or_else(|| PathBuf::from(DEFAULT_GOOGLE_TOKEN_FILE)),
        client_secrets_file: file
          .google_client_secrets_file
          .unwrap_or_else(|| PathBuf::from(DEFAULT_GOOGLE_CLIENT_SECRETS_FILE)),
      },
      adobe: AdobeCredentials {
        api_key: present(file.api_key),
        client_secret: present(file.client_secret),
        scopes: present(file.scopes),
      },
    })
  }
}
