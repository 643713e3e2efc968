//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against temp config files
//! and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "wayguide-cli", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn temp_config() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    (dir, path.to_string_lossy().into_owned())
}

#[test]
fn admin_set_point_then_info() {
    let (_dir, config) = temp_config();

    let (stdout, _, code) = run_cli(&[
        "admin", "set-point", "0", "hub", "10", "64", "-3", "--config", &config,
    ]);
    assert_eq!(code, 0, "set-point failed");
    assert!(stdout.contains("waypoint 0 set"));

    let (stdout, _, code) = run_cli(&["admin", "info", "--config", &config]);
    assert_eq!(code, 0, "info failed");
    assert!(stdout.contains("waypoints:           1"));
}

#[test]
fn admin_set_title_persists() {
    let (_dir, config) = temp_config();

    let (_, _, code) = run_cli(&[
        "admin", "set-title", "Harbour", "Tour", "--config", &config,
    ]);
    assert_eq!(code, 0, "set-title failed");
    assert!(Path::new(&config).exists());

    let (stdout, _, code) = run_cli(&["tour", "status", "--config", &config]);
    assert_eq!(code, 0, "status failed");
    assert!(stdout.contains("\"title\": \"Harbour Tour\""));
}

#[test]
fn tour_status_reports_waypoint_count() {
    let (_dir, config) = temp_config();
    run_cli(&[
        "admin", "set-point", "0", "hub", "0", "64", "0", "--config", &config,
    ]);
    run_cli(&[
        "admin", "set-point", "5", "hub", "9", "64", "0", "--config", &config,
    ]);

    let (stdout, _, code) = run_cli(&["tour", "status", "--config", &config]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"waypoints\": 2"));
}

#[test]
fn tour_run_rejects_unconfigured_tour() {
    let (_dir, config) = temp_config();
    let (stdout, _, code) = run_cli(&["tour", "run", "--user", "alice", "--config", &config]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No waypoints are configured yet."));
}
