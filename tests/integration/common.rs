use serde_json::json;
use test_support::ExportFixture;

/// URL Only config for 2024-01-01..=2024-01-02 against data source "Search Console" (id 7).
pub fn url_only_config() -> serde_json::Value {
  json!({
    "start_date": "2024-01-01",
    "end_date": "2024-01-02",
    "clicks_event": "event1",
    "url_evar": "5",
    "report_suite_id": "RS1",
    "data_source_name": "Search Console",
    "job_prefix": "gsc",
    "google_property": "sc-domain:example.com"
  })
}

fn row(date: &str, page: &str, clicks: u64) -> serde_json::Value {
  json!({ "keys": [date, page], "clicks": clicks, "impressions": 100, "ctr": 0.03, "position": 4.2 })
}

/// Fixture dir with config, one data source, three rows on day one and one on day two.
pub fn url_only_fixture() -> ExportFixture {
  let fx = ExportFixture::new();
  fx.write_json("config.json", &url_only_config());
  fx.write_json("data_sources.json", &json!([{ "id": 7, "name": "Search Console" }]));
  fx.write_json(
    "source_rows.json",
    &json!({
      "2024-01-01": [
        row("2024-01-01", "https://example.com/a", 3),
        row("2024-01-01", "https://example.com/b", 2),
        row("2024-01-01", "https://example.com/c", 1),
      ],
      "2024-01-02": [row("2024-01-02", "https://example.com/a", 5)],
    }),
  );
  fx
}

pub fn stdout_json(out: &std::process::Output) -> serde_json::Value {
  serde_json::from_slice(&out.stdout).expect("stdout is the JSON run summary")
}

pub fn job_names(uploads: &[serde_json::Value]) -> Vec<String> {
  uploads
    .iter()
    .map(|u| u["jobName"].as_str().unwrap_or_default().to_string())
    .collect()
}
