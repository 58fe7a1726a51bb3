use serde_json::json;

use crate::common::{job_names, stdout_json, url_only_fixture};

#[test]
fn successfully_imported_day_is_skipped() {
  let fx = url_only_fixture();
  fx.write_json(
    "jobs.json",
    &json!([
      { "id": 1, "fileName": "gsc_url only_2024-01-01_RS1_7_0.tab", "status": "success" }
    ]),
  );

  let out = fx.command().output().unwrap();
  assert!(out.status.success());

  assert_eq!(job_names(&fx.read_uploads()), vec!["gsc_URL Only_2024-01-02"]);
  assert_eq!(stdout_json(&out)["dates_skipped"], json!(["2024-01-01"]));
}

#[test]
fn failed_import_is_retried() {
  let fx = url_only_fixture();
  fx.write_json(
    "jobs.json",
    &json!([
      { "id": 1, "fileName": "gsc_url only_2024-01-01_RS1_7_0.tab", "status": "failed" }
    ]),
  );

  fx.command().assert().success();

  assert_eq!(
    job_names(&fx.read_uploads()),
    vec!["gsc_URL Only_2024-01-01", "gsc_URL Only_2024-01-02"]
  );
}

#[test]
fn other_mode_history_does_not_count() {
  let fx = url_only_fixture();
  fx.write_json(
    "jobs.json",
    &json!([
      { "id": 1, "fileName": "gsc_metrics only_2024-01-01_RS1_7_0.tab", "status": "success" }
    ]),
  );

  fx.command().assert().success();

  assert_eq!(fx.read_uploads().len(), 2);
}

#[test]
fn split_day_history_is_skipped() {
  let fx = url_only_fixture();
  fx.write_json(
    "jobs.json",
    &json!([
      { "id": 1, "fileName": "gsc_url only_2024-01-01_part1_RS1_7_0.tab", "status": "success" },
      { "id": 2, "fileName": "gsc_url only_2024-01-01_part2_RS1_7_1.tab", "status": "success" }
    ]),
  );

  let out = fx.command().output().unwrap();
  assert!(out.status.success());

  assert_eq!(job_names(&fx.read_uploads()), vec!["gsc_URL Only_2024-01-02"]);
  assert_eq!(stdout_json(&out)["dates_skipped"], json!(["2024-01-01"]));
}

#[test]
fn rerun_after_split_upload_sends_nothing() {
  let fx = url_only_fixture();

  let first = fx.command().args(["--batch-size", "2"]).output().unwrap();
  assert!(first.status.success());
  assert_eq!(
    job_names(&fx.read_uploads()),
    vec![
      "gsc_URL Only_2024-01-01_part1",
      "gsc_URL Only_2024-01-01_part2",
      "gsc_URL Only_2024-01-02",
    ]
  );

  let second = fx.command().args(["--batch-size", "2"]).output().unwrap();
  assert!(second.status.success());

  assert_eq!(fx.read_uploads().len(), 3);
  let summary = stdout_json(&second);
  assert_eq!(summary["dates_skipped"], json!(["2024-01-01", "2024-01-02"]));
  assert_eq!(summary["days"], json!([]));
}
