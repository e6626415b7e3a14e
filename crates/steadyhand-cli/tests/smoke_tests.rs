//! Smoke tests for the steadyhand CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the steadyhand binary, isolated from the caller's env
fn steadyhand() -> Command {
    let mut cmd = Command::cargo_bin("steadyhand").expect("steadyhand binary should exist");
    cmd.env_remove("STEADYHAND_HIGHLIGHT_ELEMENTS").env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    steadyhand()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_lists_subcommands() {
    steadyhand()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lint"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    steadyhand().assert().failure();
}

// ============================================================================
// Lint
// ============================================================================

#[test]
fn test_lint_clean_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locators.json");
    fs::write(
        &path,
        r#"{
            "submit":   { "type": "ID",    "value": "submit-btn" },
            "jobTitle": { "type": "XPath", "value": "//p[@class='position-title']" }
        }"#,
    )
    .unwrap();

    steadyhand()
        .args(["--color", "never", "lint"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All locators resolve"))
        .stderr(predicate::str::contains("PASS 2 locator(s) resolve"));
}

#[test]
fn test_lint_unsupported_type_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locators.json");
    fs::write(&path, r#"{ "careers": { "type": "linkText", "value": "Careers" } }"#).unwrap();

    steadyhand()
        .args(["--color", "never", "lint"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("LOC001"))
        .stderr(predicate::str::contains("FAIL Lint failed: 1 error(s)"));
}

#[test]
fn test_lint_json_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locators.json");
    fs::write(&path, r#"{ "submit": { "type": "css", "value": "" } }"#).unwrap();

    steadyhand()
        .args(["lint", "--json"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": \"LOC002\""));
}

#[test]
fn test_lint_missing_file() {
    steadyhand()
        .args(["lint", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    steadyhand()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"highlight_elements\": false"))
        .stdout(predicate::str::contains("\"highlight_source\": \"default\""))
        .stdout(predicate::str::contains("\"wait_timeout_ms\": 10000"));
}

#[test]
fn test_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "highlightElements: true\nscrollStep: 500\n").unwrap();

    steadyhand()
        .args(["config", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"highlight_elements\": true"))
        .stdout(predicate::str::contains("\"highlight_source\": \"file\""))
        .stdout(predicate::str::contains("\"scroll_step\": 500"));
}

#[test]
fn test_config_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "highlight_elements: true\n").unwrap();

    steadyhand()
        .env("STEADYHAND_HIGHLIGHT_ELEMENTS", "false")
        .args(["config", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"highlight_elements\": false"))
        .stdout(predicate::str::contains("\"highlight_source\": \"environment\""));
}

#[test]
fn test_config_flag_overrides_env() {
    steadyhand()
        .env("STEADYHAND_HIGHLIGHT_ELEMENTS", "false")
        .args(["config", "--highlight", "True"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"highlight_elements\": true"))
        .stdout(predicate::str::contains("\"highlight_source\": \"flag\""));
}

#[test]
fn test_config_bad_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "scrollStep: [oops\n").unwrap();

    steadyhand()
        .args(["config", "--file"])
        .arg(&path)
        .assert()
        .failure();
}
