use anyhow::Result;
use clap::Parser;

mod auth;
mod cli;
mod config;
mod dates;
mod destination;
mod ext;
mod imported;
mod layout;
mod model;
mod pipeline;
mod source;
mod transform;
mod upload;
mod util;

use crate::cli::{Cli, normalize};
use crate::destination::analytics::AnalyticsClient;
use crate::destination::fixture::FixtureDestination;
use crate::source::fixture::FixtureSource;
use crate::source::search_console::SearchConsoleClient;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_tracing();

  // Phase 1: configuration and layout (no network until both are valid)
  let today = util::effective_today(dates::parse_today_override(cli.now_override.as_deref())?);
  let cfg = normalize(&cli)?;
  let layout = layout::resolve(&cfg)?;

  // Phase 2: pick clients and run
  let summary = match &cli.fixtures {
    Some(dir) => {
      let source = FixtureSource::load(dir)?;
      let destination = FixtureDestination::new(dir);
      pipeline::run(&cfg, &layout, &source, &destination, today)?
    }
    None => {
      let token = auth::google::access_token(&cfg.google)?;
      let source = SearchConsoleClient::new(token, cfg.google_property.clone());
      let session = auth::adobe::authenticate(&cfg.adobe)?;
      let destination = AnalyticsClient::new(session);
      pipeline::run(&cfg, &layout, &source, &destination, today)?
    }
  };

  // Phase 3: machine-readable summary on stdout
  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}
