mod common;

use common::{backlog, backlog_cmd, run_json, write};
use predicates::prelude::*;
use serde_json::json;
use std::fs;

#[test]
fn validate_all_passes_on_a_clean_backlog() {
    let temp = backlog();
    backlog_cmd(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "valid: 0 errors, 0 warnings, 0 info across 3 items",
        ));
}

#[test]
fn invalid_file_exits_with_failure() {
    let temp = backlog();
    write(
        temp.path(),
        "bugs/bare.org",
        "* BUG-001 Crash\n:PROPERTIES:\n:GOAL: g\n:END:\n** TODO ITEM-010 Fix\n",
    );

    backlog_cmd(temp.path())
        .args(["validate", "bugs/bare.org"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bugs/bare.org:5: error [required-properties]"))
        .stdout(predicate::str::contains("INVALID"));

    let (ok, body) = run_json(temp.path(), &["validate", "bugs/bare.org"]);
    assert!(!ok);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["metrics"]["total_items"], 1);

    backlog_cmd(temp.path())
        .args(["validate", "projects/parser.org"])
        .assert()
        .success();
}

#[test]
fn unindexed_file_is_not_found() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["validate", "docs/design.org"]);
    assert!(!ok);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "not_found");
}

#[test]
fn missing_root_reports_error_envelope() {
    let temp = backlog();
    let missing = temp.path().join("nope");
    let (ok, body) = run_json(&missing, &["dashboard"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "missing_root");

    backlog_cmd(&missing)
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task root not found"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = backlog();
    write(temp.path(), "backlog.toml", "checkpoint_depth = 0\n");
    let (ok, body) = run_json(temp.path(), &["validate"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_config");

    write(temp.path(), "backlog.toml", "task_dir = [\"projects\"]\n");
    let (_, body) = run_json(temp.path(), &["validate"]);
    assert_eq!(body["error"]["code"], "invalid_config");
    assert!(body["message"].as_str().unwrap().contains("task_dir"));
}

#[test]
fn dashboard_reports_progress_and_workload() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["dashboard"]);
    assert!(ok, "{body}");
    let data = &body["data"];
    assert_eq!(data["generated_at"], "2024-03-10");
    assert_eq!(
        data["metrics"],
        json!({"total_items": 3, "complete": 1, "in_progress": 1, "blocked": 0, "pending": 1})
    );
    assert_eq!(data["categories"][0]["id"], "PROJ-001");
    assert_eq!(data["categories"][0]["done"], 1);
    assert_eq!(data["categories"][0]["checkpoints"][0]["id"], "CHK-001-01");
    assert_eq!(data["agents"]["backend"]["done"], 1);
    assert_eq!(data["agents"]["backend:api"]["assigned"], 1);
    assert_eq!(data["agents"]["qa"]["effort_minutes"], 60);
    assert_eq!(data["velocity"]["trend"], "increasing");

    backlog_cmd(temp.path())
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backlog dashboard (2024-03-10)"))
        .stdout(predicate::str::contains("PROJ-001"));
}

#[test]
fn blocked_lists_unfinished_dependencies() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["blocked"]);
    assert!(ok);
    assert_eq!(
        body["data"],
        json!([{"item_id": "ITEM-002", "blocked_by": ["ITEM-003"]}])
    );

    backlog_cmd(temp.path())
        .arg("blocked")
        .assert()
        .success()
        .stdout(predicate::str::contains("ITEM-002 <- ITEM-003"));
}

#[test]
fn links_reports_broken_targets() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["links"]);
    assert!(ok);
    let broken = body["data"]["broken"].as_array().unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0]["file"], "docs/design.org");
    assert_eq!(broken[0]["target"], "missing.org");
}

#[test]
fn sync_backlinks_dry_run_then_write() {
    let temp = backlog();
    let design = temp.path().join("docs/design.org");

    backlog_cmd(temp.path())
        .args(["sync-backlinks", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert_eq!(fs::read_to_string(&design).unwrap(), common::DESIGN);

    let (ok, body) = run_json(temp.path(), &["sync-backlinks"]);
    assert!(ok);
    assert_eq!(body["data"]["files_written"], json!(["docs/design.org"]));
    assert!(fs::read_to_string(&design)
        .unwrap()
        .contains(":REFERENCED_BY: ITEM-002"));

    let (_, again) = run_json(temp.path(), &["sync-backlinks"]);
    assert_eq!(again["data"]["already_present"], 1);
    assert_eq!(again["data"]["files_written"], json!([]));
}

#[test]
fn next_id_for_each_scope() {
    let temp = backlog();
    backlog_cmd(temp.path())
        .args(["next-id", "--prefix", "PROJ"])
        .assert()
        .success()
        .stdout("PROJ-002\n");
    backlog_cmd(temp.path())
        .args(["next-id", "--item"])
        .assert()
        .success()
        .stdout("ITEM-004\n");
    backlog_cmd(temp.path())
        .args(["next-id", "--checkpoint", "PROJ-001"])
        .assert()
        .success()
        .stdout("CHK-001-02\n");

    let (ok, body) = run_json(temp.path(), &["next-id", "--prefix", "ZZZ"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (_, body) = run_json(temp.path(), &["next-id", "--checkpoint", "BUG-042"]);
    assert_eq!(body["error"]["code"], "not_found");
}

#[test]
fn next_id_requires_one_selector() {
    let temp = backlog();
    backlog_cmd(temp.path()).arg("next-id").assert().failure();
    backlog_cmd(temp.path())
        .args(["next-id", "--item", "--prefix", "PROJ"])
        .assert()
        .failure();
}

#[test]
fn velocity_and_burndown_use_reference_day() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["velocity"]);
    assert!(ok);
    assert_eq!(body["data"]["window_days"], 7);
    assert_eq!(body["data"]["completed"], 1);
    assert_eq!(body["data"]["trend"], "increasing");

    let (_, body) = run_json(temp.path(), &["velocity", "--days", "1"]);
    assert_eq!(body["data"]["completed"], 0);

    let (ok, body) = run_json(temp.path(), &["burndown"]);
    assert!(ok);
    let data = &body["data"];
    assert_eq!(data["window_days"], 14);
    assert_eq!(data["remaining_items"], 2);
    assert_eq!(data["remaining_minutes"], 105);
    assert_eq!(data["completed_minutes_in_window"], 120);
    assert!(data["projected_completion"].is_string());

    let (ok, body) = run_json(temp.path(), &["burndown", "--days", "0"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_request");
}

#[test]
fn scope_resolves_enclosing_headings() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["scope", "projects/parser.org", "12"]);
    assert!(ok);
    assert_eq!(
        body["data"],
        json!({
            "file": "projects/parser.org",
            "line": 12,
            "category": "PROJ-001",
            "checkpoint": "CHK-001-01"
        })
    );

    backlog_cmd(temp.path())
        .args(["scope", "projects/parser.org", "3"])
        .assert()
        .success()
        .stdout("projects/parser.org:3: category PROJ-001, checkpoint -\n");
}

#[test]
fn clear_caches_on_a_fresh_process_drops_nothing() {
    let temp = backlog();
    backlog_cmd(temp.path())
        .arg("clear-caches")
        .assert()
        .success()
        .stdout(predicate::str::contains("agents: not built"));
}

#[test]
fn scope_resolves_parent_components_in_paths() {
    let temp = backlog();
    let (ok, body) = run_json(
        temp.path(),
        &["scope", "bugs/../projects/./parser.org", "12"],
    );
    assert!(ok, "{body}");
    assert_eq!(body["data"]["file"], "projects/parser.org");
    assert_eq!(body["data"]["checkpoint"], "CHK-001-01");
}

#[test]
fn next_id_past_the_largest_number_is_an_error() {
    let temp = backlog();
    write(
        temp.path(),
        "bugs/max.org",
        "* BUG-001 Max\n** TODO ITEM-18446744073709551615 Last\n",
    );
    let (ok, body) = run_json(temp.path(), &["next-id", "--item"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "invalid_request");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("ITEM-18446744073709551615"));
}

#[test]
fn schema_lists_report_shapes() {
    let temp = backlog();
    let (ok, body) = run_json(temp.path(), &["schema", "dashboard"]);
    assert!(ok, "{body}");
    assert!(body["data"]["properties"].get("categories").is_some());

    let (ok, body) = run_json(temp.path(), &["schema"]);
    assert!(ok);
    assert!(body["data"].get("validation").is_some());
    assert!(body["data"].get("burndown").is_some());

    let (ok, body) = run_json(temp.path(), &["schema", "nonsense"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "not_found");
}
