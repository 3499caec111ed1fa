//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the switchyard binary for testing
fn switchyard_cmd() -> Command {
    let mut cmd = Command::cargo_bin("switchyard").unwrap();
    cmd.env_remove("RUST_LOG").env("SWITCHYARD_LOG_LEVEL", "error");
    cmd
}

/// Write the example configuration into `dir` and return its path.
fn init_config(dir: &Path) -> PathBuf {
    let config_path = dir.join("switchyard.toml");
    switchyard_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();
    config_path
}

#[test]
fn test_version_output() {
    switchyard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("switchyard"));
}

#[test]
fn test_help_shows_all_commands() {
    switchyard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("backends"))
        .stdout(predicate::str::contains("select"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_select_help() {
    switchyard_cmd()
        .args(["select", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--vision"))
        .stdout(predicate::str::contains("--max-latency-ms"))
        .stdout(predicate::str::contains("--priority"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[selection]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("switchyard.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    switchyard_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exists"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert_eq!(content, "existing content");
}

#[test]
fn test_config_validate_ok() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    switchyard_cmd()
        .args(["config", "validate", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_config_validate_rejects_zero_retries() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    std::fs::write(&config_path, "[retry]\nmax_retries = 0\n").unwrap();

    switchyard_cmd()
        .args(["config", "validate", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("retry.max_retries"));
}

#[test]
fn test_backends_list_json_hides_api_keys() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    let output = switchyard_cmd()
        .env("PRIMARY_API_KEY", "sk-do-not-print")
        .args(["backends", "list", "--json", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-do-not-print").not())
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let ids: Vec<&str> = parsed["backends"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["vision-primary", "vision-fast", "local-reasoner"]);
}

#[test]
fn test_backends_list_missing_config_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    switchyard_cmd()
        .args(["backends", "list", "-c", missing.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backends configured"));
}

#[test]
fn test_backends_rank_table() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    switchyard_cmd()
        .args(["backends", "rank", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("vision-primary"))
        .stdout(predicate::str::contains("999.0"));
}

#[test]
fn test_select_speed_task_prefers_fast_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    // vision-primary: 90 + 25 + 10 (high accuracy) = 125
    // vision-fast:    80 + 25 + 15 (fast, speed task) = 120
    let output = switchyard_cmd()
        .args([
            "select",
            "--vision",
            "--priority",
            "speed",
            "--json",
            "-c",
            config_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["selection"]["backend"]["id"], "vision-primary");
    assert_eq!(parsed["selection"]["alternatives"][0], "vision-fast");
}

#[test]
fn test_select_reasoning_without_vision() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(temp_dir.path());

    switchyard_cmd()
        .args(["select", "--reasoning", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("vision-primary"));
}

#[test]
fn test_select_no_candidates_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    switchyard_cmd()
        .args(["select", "--vision", "-c", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backend satisfies requirements"));
}

#[test]
fn test_invalid_command() {
    switchyard_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    switchyard_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn test_completions_zsh() {
    switchyard_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compdef"));
}
