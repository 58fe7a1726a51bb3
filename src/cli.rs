use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{FileConfig, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "gsc-aa-exporter",
    version,
    about = "Export daily Google Search Console metrics into an Adobe Analytics Data Source",
    long_about = None
)]
pub struct Cli {
  /// Path to the JSON configuration file
  #[arg(long, short = 'c', default_value = "config.json")]
  pub config: PathBuf,

  /// Fetch and transform, but print a preview instead of uploading
  #[arg(long)]
  pub dry_run: bool,

  /// First day to export (YYYY-MM-DD); must be paired with --end-date
  #[arg(long)]
  pub start_date: Option<String>,

  /// Last day to export, inclusive (YYYY-MM-DD); must be paired with --start-date
  #[arg(long)]
  pub end_date: Option<String>,

  /// Export today and the N-1 days before it (ignored when a date range is given)
  #[arg(long)]
  pub lookback_days: Option<u32>,

  /// Cap on rows fetched per day
  #[arg(long)]
  pub max_rows_per_day: Option<usize>,

  /// Rows per upload job; larger days are split into numbered parts
  #[arg(long)]
  pub batch_size: Option<usize>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override "today" for lookback ranges (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,

  /// Read source rows and destination state from this directory instead of the live APIs (hidden; tests only)
  #[arg(long, hide = true)]
  pub fixtures: Option<PathBuf>,
}

/// Merge command-line overrides into a file configuration.
///
/// A date range on the command line replaces any configured lookback and vice versa.
pub fn apply_overrides(cli: &Cli, mut file: FileConfig) -> FileConfig {
  if cli.start_date.is_some() || cli.end_date.is_some() {
    file.start_date = cli.start_date.clone();
    file.end_date = cli.end_date.clone();
    file.lookback_days = None;
  } else if let Some(days) = cli.lookback_days {
    file.start_date = None;
    file.end_date = None;
    file.lookback_days = Some(days);
  }

  if let Some(n) = cli.max_rows_per_day {
    file.max_rows_per_day = Some(n);
  }
  if let Some(n) = cli.batch_size {
    file.batch_size = Some(n);
  }
  file.dry_run = file.dry_run || cli.dry_run;

  file
}

pub fn normalize(cli: &Cli) -> Result<RunConfig> {
  let file = FileConfig::load(&cli.config)?;
  RunConfig::from_file(apply_overrides(cli, file))
}
