//! Integration tests for the refdetect binary.

use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const BEFORE: &str = r#"{
  "classes": [
    {
      "name": "p1.Widget",
      "package": "p1",
      "range": { "file": "src/p1/Widget.java", "start_line": 1, "end_line": 5 }
    },
    {
      "name": "p1.Gadget",
      "package": "p1",
      "range": { "file": "src/p1/Gadget.java", "start_line": 1, "end_line": 5 }
    }
  ],
  "folders": ["src/p1", "src/p2"]
}"#;

const AFTER: &str = r#"{
  "classes": [
    {
      "name": "p2.Widget",
      "package": "p2",
      "range": { "file": "src/p2/Widget.java", "start_line": 1, "end_line": 5 }
    },
    {
      "name": "p1.Gadget",
      "package": "p1",
      "range": { "file": "src/p1/Gadget.java", "start_line": 1, "end_line": 5 }
    }
  ],
  "folders": ["src/p1", "src/p2"]
}"#;

fn refdetect(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_refdetect"));
    command
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("CLICOLOR_FORCE")
        .env_remove("RUST_LOG")
        .env_remove("REFDETECT_JOBS");
    command
}

fn snapshots(dir: &Path) -> (PathBuf, PathBuf) {
    let before = dir.join("before.json");
    let after = dir.join("after.json");
    fs::write(&before, BEFORE).unwrap();
    fs::write(&after, AFTER).unwrap();
    (before, after)
}

#[test]
fn compare_writes_json_report() {
    let temp = TempDir::new().unwrap();
    let (before, after) = snapshots(temp.path());

    let assert = refdetect(temp.path())
        .args(["compare", "--format", "json", "--commit", "abc123"])
        .arg(&before)
        .arg(&after)
        .assert()
        .success();

    let json: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let commit = &json["commits"][0];
    assert_eq!(commit["sha1"], "abc123");
    let refactorings = commit["refactorings"].as_array().unwrap();
    assert_eq!(refactorings.len(), 1);
    assert_eq!(refactorings[0]["type"], "Move Class");
    assert_eq!(refactorings[0]["description"], "Move Class p1.Widget moved to p2.Widget");
    assert_eq!(refactorings[0]["rightSideLocations"][0]["filePath"], "src/p2/Widget.java");
}

#[test]
fn compare_writes_to_output_file() {
    let temp = TempDir::new().unwrap();
    let (before, after) = snapshots(temp.path());
    let report = temp.path().join("report.txt");

    refdetect(temp.path())
        .args(["compare", "--no-parallel", "--output"])
        .arg(&report)
        .arg(&before)
        .arg(&after)
        .assert()
        .success();

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("commit working-copy (1 refactorings)"));
    assert!(text.contains("Move Class p1.Widget moved to p2.Widget"));
}

#[test]
fn missing_snapshot_fails() {
    let temp = TempDir::new().unwrap();
    let output = refdetect(temp.path())
        .args(["compare", "missing-before.json", "missing-after.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load before snapshot"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    refdetect(temp.path()).arg("init").assert().success();

    let written = fs::read_to_string(temp.path().join(".refdetect.toml")).unwrap();
    assert!(written.contains("search_window = 24"));

    refdetect(temp.path()).arg("init").assert().failure();
    refdetect(temp.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn batch_uses_discovered_configuration() {
    let temp = TempDir::new().unwrap();
    let commit = temp.path().join("history").join("c1");
    fs::create_dir_all(&commit).unwrap();
    fs::write(commit.join("before.json"), BEFORE).unwrap();
    fs::write(commit.join("after.json"), AFTER).unwrap();
    fs::write(
        temp.path().join(".refdetect.toml"),
        "[parallel]\nenabled = false\n",
    )
    .unwrap();

    let assert = refdetect(temp.path())
        .args(["batch", "history", "--format", "json"])
        .assert()
        .success();
    let json: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["commits"][0]["sha1"], "c1");
}

#[test]
fn invalid_configuration_is_reported() {
    let temp = TempDir::new().unwrap();
    let (before, after) = snapshots(temp.path());
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[matching]\noperation_coverage = 2.5\n").unwrap();

    refdetect(temp.path())
        .args(["compare", "--config"])
        .arg(&config)
        .arg(&before)
        .arg(&after)
        .assert()
        .failure();
}
