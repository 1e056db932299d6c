//! CLI Integration Tests
//!
//! These tests verify the CLI commands work correctly end-to-end.
//! They test the "wiring" between the CLI and the core library.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a CLI command that never touches the system logger
fn cli_cmd() -> Command {
    let mut cmd = Command::cargo_bin("logfan").expect("Failed to find logfan binary");
    cmd.arg("--no-syslog");
    cmd
}

/// Create a CLI command with the system logger at its default levels
fn cli_cmd_with_syslog() -> Command {
    Command::cargo_bin("logfan").expect("Failed to find logfan binary")
}

// ============================================================================
// Log Command Tests
// ============================================================================

#[test]
fn test_log_info_goes_to_stdout_and_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("cli.log");

    cli_cmd()
        .args(["log", "info", "hello from the cli", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from the cli"))
        .stdout(predicate::str::contains("[info]"));

    let contents = std::fs::read_to_string(&file).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.ends_with("hello from the cli\n"));
}

#[test]
fn test_log_error_goes_to_stderr() {
    cli_cmd()
        .args(["log", "error", "something broke"])
        .assert()
        .success()
        .stderr(predicate::str::contains("something broke"))
        .stdout(predicate::str::contains("something broke").not());
}

#[test]
fn test_log_with_no_destination_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("silent.json");
    std::fs::write(
        &config,
        r#"{ "stdout": { "levels": "", "opts": "" }, "stderr": { "levels": "", "opts": "" } }"#,
    )
    .unwrap();

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .args(["log", "info", "into the void"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No destinations registered for level info"));
}

#[test]
fn test_config_options_apply() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("msgonly.json");
    // Masks use the bitflags text form; 0x7f00 is every field flag.
    std::fs::write(
        &config,
        r#"{ "stdout": { "levels": "0xff", "opts": "NOHOST | NOTIME | NOLEVEL | NONAME | NOMSEC | NOPID | NOTID" }, "process_name": "cfg" }"#,
    )
    .unwrap();

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .args(["log", "notice", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plain"))
        .stdout(predicate::str::contains("[notice]").not());
}

#[test]
fn test_log_at_syslog_level_succeeds() {
    // Notice is accepted by syslog by default; the outcome must not depend on
    // whether the host runs a syslog daemon.
    cli_cmd_with_syslog()
        .args(["log", "notice", "reaches syslog if it can"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reaches syslog if it can"));
}

#[test]
fn test_invalid_level_rejected() {
    cli_cmd()
        .args(["log", "loud", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown level"));
}

#[test]
fn test_missing_config_file() {
    cli_cmd()
        .args(["--config", "/definitely/not/here.json", "log", "info", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading config"));
}

// ============================================================================
// Race and Perf Command Tests
// ============================================================================

#[test]
fn test_race_verifies_every_file() {
    let temp = TempDir::new().unwrap();

    cli_cmd()
        .args(["race", "--threads", "4", "--messages", "300", "--dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("race passed: 4 threads"));

    for thread in 0..4 {
        assert!(temp.path().join(format!("race-{thread}.log")).exists());
    }
}

#[test]
fn test_race_with_syslog_enabled_stays_off_syslog() {
    let temp = TempDir::new().unwrap();

    cli_cmd_with_syslog()
        .args(["race", "--threads", "8", "--messages", "100", "--dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("race passed: 8 threads"));
}

#[test]
fn test_race_rejects_too_many_threads() {
    let temp = TempDir::new().unwrap();
    cli_cmd()
        .args(["race", "--threads", "9", "--dir"])
        .arg(temp.path())
        .assert()
        .failure();
}

#[test]
fn test_perf_reports_rates() {
    let temp = TempDir::new().unwrap();

    cli_cmd()
        .args(["perf", "--lines", "200", "--dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("stdout: 200 lines"))
        .stdout(predicate::str::contains("file: 200 lines"));

    let contents = std::fs::read_to_string(temp.path().join("perf.log")).unwrap();
    assert_eq!(contents.lines().count(), 200);
}
