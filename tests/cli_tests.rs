//! CLI tests for the `pomodoro-board` binary.
//!
//! These run the compiled binary with a temporary config file, so no
//! daemon or API server is needed.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let socket = dir.join("missing.sock");
    let text = format!(
        "socket_path = {:?}\napi_base_url = \"http://127.0.0.1:9\"\nrequest_timeout_secs = 2\n{}",
        socket.display().to_string(),
        extra
    );
    std::fs::write(&path, text).unwrap();
    path
}

fn cmd() -> Command {
    Command::cargo_bin("pomodoro-board").unwrap()
}

#[test]
fn test_help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("daemon"))
        .stdout(predicate::str::contains("calendar"))
        .stdout(predicate::str::contains("task"));
}

#[test]
fn test_completions_bash() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pomodoro-board"));
}

#[test]
fn test_modes_include_configured_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "\n[[modes]]\nname = \"sprint\"\nwork_minutes = 15\nbreak_minutes = 3\ncolor = \"#3498db\"\n",
    );

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("modes")
        .assert()
        .success()
        .stdout(predicate::str::contains("light"))
        .stdout(predicate::str::contains("deep"))
        .stdout(predicate::str::contains("sprint"));
}

#[test]
fn test_invalid_mode_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "\n[[modes]]\nname = \"broken\"\nwork_minutes = 0\nbreak_minutes = 3\ncolor = \"#3498db\"\n",
    );

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("modes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_calendar_for_month() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["calendar", "--month", "2026-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February 2026"))
        .stdout(predicate::str::contains("Su  Mo"));
}

#[test]
fn test_status_without_daemon_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not connect to the daemon"));
}

#[test]
fn test_stats_unreachable_api_shows_hint() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GET /api/stats"))
        .stderr(predicate::str::contains("Hint: Check that the API server is running"));
}

#[test]
fn test_task_add_validates_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["task", "add", "Essay"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("estimated time must be greater than zero"));
}

#[test]
fn test_unknown_command_fails() {
    cmd().arg("resume").assert().failure();
}
