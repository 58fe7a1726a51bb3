use crate::common::{job_names, stdout_json, url_only_fixture};

#[test]
fn exports_each_day_as_one_job() {
  let fx = url_only_fixture();
  let out = fx.command().output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let uploads = fx.read_uploads();
  assert_eq!(job_names(&uploads), vec!["gsc_URL Only_2024-01-01", "gsc_URL Only_2024-01-02"]);

  let first = &uploads[0];
  assert_eq!(first["reportSuiteID"], "RS1");
  assert_eq!(first["dataSourceID"], "7");
  assert_eq!(first["finished"], true);
  assert_eq!(first["columns"], serde_json::json!(["Date", "Evar 5", "Event event1"]));
  assert_eq!(
    first["rows"][0],
    serde_json::json!(["01/01/2024/00/00/00", "https://example.com/a", "3"])
  );

  let summary = stdout_json(&out);
  assert_eq!(summary["mode"], "URL Only");
  assert_eq!(summary["dates_planned"], 2);
  assert_eq!(summary["days"][0]["rows"], 3);
  assert_eq!(summary["days"][1]["rows"], 1);
}

#[test]
fn batch_size_flag_splits_large_days_into_parts() {
  let fx = url_only_fixture();
  let out = fx.command().args(["--batch-size", "2"]).output().unwrap();
  assert!(out.status.success());

  let uploads = fx.read_uploads();
  assert_eq!(
    job_names(&uploads),
    vec![
      "gsc_URL Only_2024-01-01_part1",
      "gsc_URL Only_2024-01-01_part2",
      "gsc_URL Only_2024-01-02",
    ]
  );
  assert_eq!(uploads[0]["rows"].as_array().unwrap().len(), 2);
  assert_eq!(uploads[1]["rows"].as_array().unwrap().len(), 1);
}

#[test]
fn dry_run_previews_without_uploading() {
  let fx = url_only_fixture();
  let out = fx.command().arg("--dry-run").output().unwrap();
  assert!(out.status.success());

  assert!(!fx.has_uploads());
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("[dry-run] Columns: Date | Evar 5 | Event event1"), "stderr: {}", stderr);

  let summary = stdout_json(&out);
  assert_eq!(summary["dry_run"], true);
  assert_eq!(summary["days"][0]["jobs"][0], "gsc_URL Only_2024-01-01");
}

#[test]
fn max_rows_per_day_caps_each_day() {
  let fx = url_only_fixture();
  let out = fx.command().args(["--max-rows-per-day", "2"]).output().unwrap();
  assert!(out.status.success());

  let uploads = fx.read_uploads();
  assert_eq!(uploads[0]["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn lookback_counts_back_from_today() {
  let fx = url_only_fixture();
  let out = fx
    .command()
    .args(["--lookback-days", "3", "--now-override", "2024-01-02"])
    .output()
    .unwrap();
  assert!(out.status.success());

  // 2024-01-02, 2024-01-01, 2023-12-31 (no rows)
  assert_eq!(
    job_names(&fx.read_uploads()),
    vec!["gsc_URL Only_2024-01-02", "gsc_URL Only_2024-01-01"]
  );
  let summary = stdout_json(&out);
  assert_eq!(summary["dates_planned"], 3);
  assert_eq!(summary["days"][2]["date"], "2023-12-31");
  assert_eq!(summary["days"][2]["rows"], 0);
}
