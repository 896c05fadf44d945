//! End-to-end tests for the treino binary.
//!
//! Every test runs against its own temporary data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Monday
const MONDAY: &str = "2024-03-04";

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("treino"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("Failed to read document");
    serde_json::from_str(&text).expect("Document is not valid JSON")
}

fn create_monday_plan(data_dir: &Path) {
    cli(data_dir)
        .args(["plan", "create", "--weekday", "mon", "--group", "peito,braços"])
        .args(["--exercise", "Supino Reto", "--exercise", "Rosca Direta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan"));
}

fn log_monday_session(data_dir: &Path, kg: &str) {
    cli(data_dir)
        .args(["session", "start", "--date", MONDAY, "--auto-complete"])
        .args(["--weight", &format!("Supino Reto={}", kg)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session logged"));
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("treino"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Strength training planner and workout logger",
        ));
}

#[test]
fn test_catalog_list_uses_seed_without_writing() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supino Reto"))
        .stdout(predicate::str::contains("Quadríceps"));

    assert!(!temp_dir.path().join("catalog.json").exists());
}

#[test]
fn test_catalog_add_and_remove() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["catalog", "add", "--group", "Costas", "--sub-group", "Dorsais"])
        .args(["--kind", "multi_joint", "--name", "Remada Cavalinho"])
        .args(["--sets", "3", "--reps", "8-10", "--rest", "90"])
        .assert()
        .success();
    assert!(data_dir.join("catalog.json").exists());

    cli(data_dir)
        .args(["catalog", "list", "--sub-group", "Dorsais"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remada Cavalinho"));

    cli(data_dir)
        .args(["catalog", "remove", "--sub-group", "Dorsais", "--name", "Remada Cavalinho"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 entry"));

    // Removing again is a no-op
    cli(data_dir)
        .args(["catalog", "remove", "--sub-group", "Dorsais", "--name", "Remada Cavalinho"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercise named"));
}

#[test]
fn test_catalog_add_rejects_blank_name() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["catalog", "add", "--group", "Costas", "--sub-group", "Dorsais"])
        .args(["--kind", "isolated", "--name", "  "])
        .args(["--sets", "3", "--reps", "10", "--rest", "60"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_generate_with_seed_is_reproducible() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let run = || {
        cli(data_dir)
            .args(["generate", "--group", "pernas", "--minutes", "20", "--seed", "7"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Estimated"))
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
    assert!(!data_dir.join("plans.json").exists());
}

#[test]
fn test_generate_rejects_bad_input() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["generate", "--group", "peito", "--minutes", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));

    cli(temp_dir.path())
        .args(["generate", "--group", "peito,costas,ombros,pernas", "--minutes", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_generate_save_creates_plan() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["generate", "--group", "costas", "--minutes", "15", "--weekday", "tue", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved plan"));

    let plans = read_json(&data_dir.join("plans.json"));
    assert_eq!(plans.as_array().map(|a| a.len()), Some(1));
    assert_eq!(plans[0]["weekdays"][0], "Tue");
}

#[test]
fn test_plan_weekday_conflict() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);

    cli(data_dir)
        .args(["plan", "create", "--weekday", "mon,fri", "--group", "pernas"])
        .args(["--exercise", "Leg Press"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already assigned"));

    cli(data_dir)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mon"))
        .stdout(predicate::str::contains("2 exercises"));
}

#[test]
fn test_plan_exercise_outside_groups_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["plan", "create", "--weekday", "wed", "--group", "peito"])
        .args(["--exercise", "Supino Reto", "--exercise", "Leg Press"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not among the plan's groups"));

    assert!(!data_dir.join("plans.json").exists());
}

#[test]
fn test_plan_show_and_delete() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);

    let plans = read_json(&data_dir.join("plans.json"));
    let id = plans[0]["id"].as_str().unwrap().to_string();

    cli(data_dir)
        .args(["plan", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Peitoral Médio"))
        .stdout(predicate::str::contains("Rosca Direta"));

    cli(data_dir).args(["plan", "delete", &id]).assert().success();
    cli(data_dir)
        .args(["plan", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_session_logs_history_once_per_day() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);
    log_monday_session(data_dir, "70");

    let history = read_json(&data_dir.join("history.json"));
    assert_eq!(history.as_array().map(|a| a.len()), Some(1));
    assert_eq!(history[0]["date"], "04-03-2024");
    assert_eq!(history[0]["weights"]["Supino Reto"], 70.0);
    assert!(history[0]["weights"]["Rosca Direta"].is_null());

    cli(data_dir)
        .args(["session", "start", "--date", MONDAY, "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already completed"));
}

#[test]
fn test_session_needs_plan_for_the_day() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);

    cli(data_dir)
        .args(["session", "start", "--date", "2024-03-05", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan scheduled for Tue"));
    assert!(!data_dir.join("history.json").exists());
}

#[test]
fn test_hidden_entry_allows_another_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);
    log_monday_session(data_dir, "70");

    let history = read_json(&data_dir.join("history.json"));
    let id = history[0]["id"].as_str().unwrap().to_string();

    cli(data_dir).args(["history", "hide", &id]).assert().success();

    cli(data_dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions logged"));
    cli(data_dir)
        .args(["history", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[hidden]"));

    log_monday_session(data_dir, "72");
    let history = read_json(&data_dir.join("history.json"));
    assert_eq!(history.as_array().map(|a| a.len()), Some(2));
}

#[test]
fn test_stats_and_calendar() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);
    log_monday_session(data_dir, "70");

    cli(data_dir)
        .args(["stats", "--exercise", "Supino Reto", "--year", "2024", "--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W1"))
        .stdout(predicate::str::contains("70.0 kg"))
        .stdout(predicate::str::contains("no data"));

    cli(data_dir)
        .args(["stats", "--exercise", "Supino Reto", "--granularity", "fortnights"])
        .assert()
        .failure();

    cli(data_dir)
        .args(["calendar", "--exercise", "Supino Reto", "--year", "2024", "--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" 4*+"));
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    create_monday_plan(data_dir);
    log_monday_session(data_dir, "70");

    let out = data_dir.join("export/history.csv");
    cli(data_dir)
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("Supino Reto,70.0,true"));
}

#[test]
fn test_corrupted_document_is_not_overwritten() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plans_path = data_dir.join("plans.json");
    fs::write(&plans_path, "{ invalid json }}}}").unwrap();

    cli(data_dir)
        .args(["plan", "create", "--weekday", "mon", "--group", "peito"])
        .args(["--exercise", "Supino Reto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));

    assert_eq!(fs::read_to_string(&plans_path).unwrap(), "{ invalid json }}}}");
}
