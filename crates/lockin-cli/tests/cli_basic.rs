//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(data_dir, args, "")
}

fn run_cli_with_input(data_dir: &Path, args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lockin"))
        .args(args)
        .env("LOCKIN_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn set_focus_source(data_dir: &Path, source: &str) {
    let output = run_cli(data_dir, &["config", "set", "focus.source", source]);
    assert_eq!(output.0, 0, "config set failed: {}", output.2);
}

#[test]
fn test_config_get_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["config", "get", "schedule.work_minutes"]);
    assert_eq!(output.0, 0, "Config get failed: {}", output.2);
    assert_eq!(output.1.trim(), "25");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_clamps_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["config", "set", "schedule.break_minutes", "500"]);
    assert_eq!(output.0, 0, "Config set failed: {}", output.2);
    assert!(output.1.contains("schedule.break_minutes = 60"));

    let output = run_cli(dir.path(), &["config", "get", "schedule.break_minutes"]);
    assert_eq!(output.1.trim(), "60");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["config", "get", "schedule.nope"]);
    assert_eq!(output.0, 1);
    assert!(output.2.contains("error:"));
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    set_focus_source(dir.path(), "never");

    let output = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(output.0, 0);
    let parsed: serde_json::Value = serde_json::from_str(&output.1).unwrap();
    assert_eq!(parsed["focus"]["source"], "never");

    let output = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(output.0, 0);
    let output = run_cli(dir.path(), &["config", "get", "focus.source"]);
    assert_eq!(output.1.trim(), "http");
}

#[test]
fn test_status_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["status"]);
    assert_eq!(output.0, 0, "Status failed: {}", output.2);
    let parsed: serde_json::Value = serde_json::from_str(&output.1).unwrap();
    assert_eq!(parsed["lives"], 5);
    assert_eq!(parsed["phase"], "idle");
    assert_eq!(parsed["is_locked_out"], false);
    assert_eq!(parsed["remaining_secs"], 1500);
}

#[test]
fn test_stats_empty_day() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["stats"]);
    assert_eq!(output.0, 0, "Stats failed: {}", output.2);
    let parsed: serde_json::Value = serde_json::from_str(&output.1).unwrap();
    assert_eq!(parsed["work_sessions"], 0);
}

#[test]
fn test_focus_static_source() {
    let dir = tempfile::tempdir().unwrap();
    set_focus_source(dir.path(), "always");
    let output = run_cli(dir.path(), &["focus"]);
    assert_eq!(output.0, 0, "Focus failed: {}", output.2);
    let parsed: serde_json::Value = serde_json::from_str(&output.1).unwrap();
    assert_eq!(parsed["reading"], "focused");
}

#[test]
fn test_run_pause_costs_a_life() {
    let dir = tempfile::tempdir().unwrap();
    set_focus_source(dir.path(), "always");

    let output = run_cli_with_input(
        dir.path(),
        &["run", "--quiet"],
        "start\npause\nyes\nquit\n",
    );
    assert_eq!(output.0, 0, "Run failed: {}", output.2);
    assert!(output.1.contains("\"type\":\"session_started\""));
    assert!(output.1.contains("\"type\":\"paused\""));
    assert!(output.1.contains("\"type\":\"life_lost\""));

    let status = run_cli(dir.path(), &["status"]);
    let parsed: serde_json::Value = serde_json::from_str(&status.1).unwrap();
    assert_eq!(parsed["lives"], 4);
}

#[test]
fn test_run_ephemeral_leaves_lives_alone() {
    let dir = tempfile::tempdir().unwrap();
    set_focus_source(dir.path(), "never");

    let output = run_cli_with_input(
        dir.path(),
        &["run", "--ephemeral", "--quiet"],
        "start\npause\nyes\n",
    );
    assert_eq!(output.0, 0, "Run failed: {}", output.2);
    assert!(output.1.contains("\"remaining\":4"));

    let status = run_cli(dir.path(), &["status"]);
    let parsed: serde_json::Value = serde_json::from_str(&status.1).unwrap();
    assert_eq!(parsed["lives"], 5);
}

#[test]
fn test_run_rejects_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    set_focus_source(dir.path(), "never");
    let output = run_cli_with_input(dir.path(), &["run", "--ephemeral", "--quiet"], "dance\n");
    assert_eq!(output.0, 0);
    assert!(output.2.contains("unknown command: dance"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(output.0, 0);
    assert!(output.1.contains("lockin"));
}
