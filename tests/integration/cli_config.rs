use predicates::prelude::*;
use serde_json::json;
use test_support::ExportFixture;

use crate::common::{url_only_config, url_only_fixture};

#[test]
fn no_metric_events_aborts_before_any_call() {
  let fx = url_only_fixture();
  let mut cfg = url_only_config();
  cfg["clicks_event"] = json!("");
  fx.write_json("config.json", &cfg);

  fx.command()
    .assert()
    .failure()
    .stderr(predicate::str::contains("No metric events configured"));
  assert!(!fx.has_uploads());
}

#[test]
fn unknown_data_source_is_fatal() {
  let fx = url_only_fixture();
  fx.write_json("data_sources.json", &json!([{ "id": 8, "name": "Something Else" }]));

  fx.command()
    .assert()
    .failure()
    .stderr(predicate::str::contains("Please check your configured Data Source name"));
  assert!(!fx.has_uploads());
}

#[test]
fn missing_config_file_names_the_path() {
  let fx = ExportFixture::new();

  fx.command()
    .assert()
    .failure()
    .stderr(predicate::str::contains("config.json"));
}

#[test]
fn start_date_without_end_date_is_rejected() {
  let fx = url_only_fixture();
  let mut cfg = url_only_config();
  cfg.as_object_mut().unwrap().remove("end_date");
  fx.write_json("config.json", &cfg);

  fx.command()
    .assert()
    .failure()
    .stderr(predicate::str::contains("must be given together"));
}

#[test]
fn bad_now_override_is_rejected() {
  let fx = url_only_fixture();

  fx.command()
    .args(["--now-override", "yesterday"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--now-override"));
}
