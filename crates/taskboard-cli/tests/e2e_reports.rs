//! E2E tests for the `tb` binary against the bundled demo seed.
//!
//! Every command runs in an empty temp dir with an isolated config home, so
//! only the flags, env vars and files each test sets up are in play.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn demo_seed() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/seed.json")
}

fn tb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tb"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env("HOME", dir);
    cmd.env("TASKBOARD_LOG", "error");
    cmd.env_remove("TASKBOARD_SEED");
    cmd.env_remove("FORMAT");
    cmd
}

fn tb_json(dir: &Path, args: &[&str]) -> Value {
    let output = tb_cmd(dir)
        .arg("--seed")
        .arg(demo_seed())
        .arg("--json")
        .args(args)
        .output()
        .expect("tb should not crash");
    assert!(
        output.status.success(),
        "tb {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["id"].as_str().expect("id").to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn overview_json_has_counts_and_projects() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["overview"]);
    assert_eq!(json["projects_count"], 3);
    assert_eq!(json["users_count"], 4);
    assert_eq!(json["tasks_count"], 10);
    assert_eq!(json["status_distribution"]["total"], 10);
    assert_eq!(json["projects"]["Mobile App"]["total"], 3);
}

#[test]
fn project_counts_for_known_project() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["project", "p1"]);
    assert_eq!(json["name"], "Website Redesign");
    assert_eq!(json["counts"]["total"], 4);
    assert_eq!(json["counts"]["done"], 1);
}

#[test]
fn unknown_project_is_an_error() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .arg("--seed")
        .arg(demo_seed())
        .args(["project", "p404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project 'p404' not found"));
}

#[test]
fn list_filters_compose() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(
        dir.path(),
        &["list", "--priority", "high", "--from", "2024-03-01", "--to", "2024-03-31"],
    );
    assert_eq!(ids(&json), ["t1", "t2"]);

    let json = tb_json(dir.path(), &["list", "--assignee", "u4", "--status", "todo"]);
    assert_eq!(ids(&json), ["t9"]);
}

#[test]
fn list_with_bad_date_reports_error_code() {
    let dir = TempDir::new().unwrap();
    let output = tb_cmd(dir.path())
        .arg("--seed")
        .arg(demo_seed())
        .args(["--json", "list", "--from", "yesterday", "--to", "2024-03-31"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    // The structured error comes first; anyhow's summary line follows it.
    let err: Value = serde_json::Deserializer::from_slice(&output.stderr)
        .into_iter::<Value>()
        .next()
        .expect("JSON error on stderr")
        .unwrap();
    assert_eq!(err["error"]["error_code"], "E2003");
}

#[test]
fn show_includes_comment_thread_in_order() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["show", "t2"]);
    assert_eq!(json["title"], "Implement landing page");
    let comments: Vec<_> = json["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(comments, ["c1", "c2", "c5"]);
}

#[test]
fn show_missing_task_explains_itself() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .arg("--seed")
        .arg(demo_seed())
        .args(["show", "t404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task 't404' not found"))
        .stderr(predicate::str::contains("tb list"));
}

#[test]
fn workload_is_keyed_by_user_name() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["workload"]);
    assert_eq!(json["Dana Okafor"]["total"], 3);
    assert_eq!(json["Chen Wei"]["done"], 2);
}

#[test]
fn overdue_rule_flag_narrows_results() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["overdue", "--rule", "critical_overdue"]);
    assert_eq!(ids(&json), ["t3", "t5"]);
}

#[test]
fn overdue_compare_reports_identical_results() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["overdue", "--compare"]);
    assert_eq!(json["results_identical"], true);
    assert_eq!(json["cache"]["hits"], 2);
    assert_eq!(json["cache"]["misses"], 1);
    assert_eq!(
        json["overdue_tasks_count"],
        json["tasks"].as_array().unwrap().len()
    );
}

#[test]
fn traverse_keeps_seed_order() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["traverse", "--status", "review,todo"]);
    let ids: Vec<_> = json.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(ids, ["t3", "t4", "t6", "t8", "t9"]);
}

#[test]
fn validate_reports_every_task() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["validate"]);
    assert_eq!(json.as_object().unwrap().len(), 10);
    assert_eq!(json["t1"]["outcome"], "success");
}

#[test]
fn summary_text_lists_counts() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .arg("--seed")
        .arg(demo_seed())
        .args(["--format", "text", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks  10"));
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

#[test]
fn create_prints_task_and_event() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(
        dir.path(),
        &[
            "create",
            "--title",
            "Dark mode",
            "--desc",
            "Support the system dark theme",
            "--project",
            "p2",
        ],
    );
    assert_eq!(json["task"]["project_id"], "p2");
    assert_eq!(json["task"]["status"], "todo");
    assert_eq!(json["tasks_count"], 11);
    assert_eq!(json["events"][0]["name"], "task_created");
    assert_eq!(json["events"][0]["payload"]["title"], "Dark mode");
}

#[test]
fn create_rejects_invalid_task_with_messages() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .arg("--seed")
        .arg(demo_seed())
        .args([
            "create",
            "--title",
            "Hi",
            "--desc",
            "Short",
            "--status",
            "in_progress",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2004"))
        .stderr(predicate::str::contains("Assignee is required"));
}

#[test]
fn status_change_emits_task_updated() {
    let dir = TempDir::new().unwrap();
    let json = tb_json(dir.path(), &["status", "t3", "review"]);
    assert_eq!(json["previous"], "todo");
    assert_eq!(json["task"]["status"], "review");
    assert_eq!(json["events"][0]["name"], "task_updated");
}

#[test]
fn pipeline_skips_rejected_drafts() {
    let dir = TempDir::new().unwrap();
    let drafts = dir.path().join("drafts.json");
    std::fs::write(
        &drafts,
        r#"[
            {"id": "n1", "project_id": "p1", "title": "Cookie banner",
             "desc": "Consent banner for EU visitors", "status": "todo", "priority": "medium"},
            {"id": "n2", "project_id": "p1", "title": "",
             "desc": "", "status": "todo", "priority": "urgent"},
            {"id": "n3", "project_id": "p3", "title": "Backfill job",
             "desc": "Backfill last year of events", "status": "in_progress",
             "priority": "high", "assignee": "u4"}
        ]"#,
    )
    .unwrap();

    let json = tb_json(dir.path(), &["pipeline", drafts.to_str().unwrap()]);
    assert_eq!(json["accepted"], 2);
    assert_eq!(json["rejected"], 1);
    assert_eq!(json["final_count"], 12);
    assert_eq!(json["steps"][1]["ok"], false);
    assert_eq!(json["steps"][1]["tasks_count"], 11);
}

#[test]
fn pipeline_rejects_ids_already_in_use() {
    let dir = TempDir::new().unwrap();
    let drafts = dir.path().join("drafts.json");
    std::fs::write(
        &drafts,
        r#"[
            {"id": "t1", "project_id": "p1", "title": "Homepage again",
             "desc": "Same id as the seeded homepage task", "status": "todo", "priority": "low"},
            {"id": "n1", "project_id": "p1", "title": "Cookie banner",
             "desc": "Consent banner for EU visitors", "status": "todo", "priority": "medium"},
            {"id": "n1", "project_id": "p2", "title": "Cookie banner twice",
             "desc": "Repeats the id of the previous draft", "status": "todo", "priority": "low"}
        ]"#,
    )
    .unwrap();

    let json = tb_json(dir.path(), &["pipeline", drafts.to_str().unwrap()]);
    assert_eq!(json["accepted"], 1);
    assert_eq!(json["rejected"], 2);
    assert_eq!(json["final_count"], 11);
    assert_eq!(json["steps"][0]["ok"], false);
    assert_eq!(json["steps"][0]["errors"][0], "Task id t1 already exists");
    assert_eq!(json["steps"][2]["ok"], false);
    assert_eq!(json["steps"][2]["errors"][0], "Task id n1 already exists");
}

// ---------------------------------------------------------------------------
// Configuration and errors
// ---------------------------------------------------------------------------

#[test]
fn missing_seed_has_error_code_and_hint() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .arg("overview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"))
        .stderr(predicate::str::contains("--seed"));
}

#[test]
fn seed_env_var_is_honoured() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .env("TASKBOARD_SEED", demo_seed())
        .args(["--format", "text", "overview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks  10"));
}

#[test]
fn project_config_sets_seed_and_rules() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::copy(demo_seed(), data.join("seed.json")).unwrap();
    std::fs::write(
        dir.path().join("taskboard.toml"),
        "[overdue]\nrules = [\"critical_overdue\"]\n",
    )
    .unwrap();

    let output = tb_cmd(dir.path())
        .args(["--json", "overdue"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ids(&json), ["t3", "t5"]);
}

#[test]
fn malformed_config_names_the_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("taskboard.toml"), "[overdue\nrules = 1").unwrap();
    tb_cmd(dir.path())
        .arg("overview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("taskboard.toml"));
}

#[test]
fn malformed_seed_is_reported() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("bad.json");
    std::fs::write(&seed, r#"{"tasks": [{"id": "t1"}]}"#).unwrap();
    tb_cmd(dir.path())
        .arg("--seed")
        .arg(&seed)
        .arg("overview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().unwrap();
    tb_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tb"));
}
