//! CLI snapshot integration tests
//!
//! Drive the `sheetkeep` binary against a scratch database file.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sheetkeep"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .env_remove("SHEETKEEP_DATABASE_PATH")
        .env_remove("SHEETKEEP_DEFAULT_WORKBOOK_KEY")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn setup(temp_dir: &TempDir) -> (String, PathBuf) {
    let db = temp_dir.path().join("data").join("cli.db");
    let file = temp_dir.path().join("book.json");
    fs::write(&file, r#"{"cells": {"A1": 1}}"#).unwrap();
    (db.to_str().unwrap().to_string(), file)
}

#[test]
fn test_cli_snapshot_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let (db, file) = setup(&temp_dir);
    let file = file.to_str().unwrap();

    // Nothing stored yet
    let output = run(temp_dir.path(), &["snapshot", "latest", "--key", "sheet-a", "--db", &db]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output), Value::Null);

    // First save creates version 1
    let output = run(
        temp_dir.path(),
        &["snapshot", "save", "--file", file, "--key", "sheet-a", "--db", &db],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output);
    assert_eq!(body["created"], true);
    assert_eq!(body["version"], 1);

    // Locked save against version 1 succeeds
    let output = run(
        temp_dir.path(),
        &["snapshot", "save", "--file", file, "--key", "sheet-a", "--version", "1", "--db", &db],
    );
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], 2);

    // Stale save fails with a conflict
    let output = run(
        temp_dir.path(),
        &["snapshot", "save", "--file", file, "--key", "sheet-a", "--version", "1", "--db", &db],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("version conflict"));

    let output = run(temp_dir.path(), &["snapshot", "latest", "--key", "sheet-a", "--db", &db]);
    let latest = stdout_json(&output);
    assert_eq!(latest["version"], 2);
    assert_eq!(latest["data"]["cells"]["A1"], 1);

    // Delete twice, both succeed
    for _ in 0..2 {
        let output = run(temp_dir.path(), &["snapshot", "delete", "--key", "sheet-a", "--db", &db]);
        assert!(output.status.success());
    }
    let output = run(temp_dir.path(), &["snapshot", "latest", "--key", "sheet-a", "--db", &db]);
    assert_eq!(stdout_json(&output), Value::Null);
}

#[test]
fn test_cli_rejects_non_object_file() {
    let temp_dir = TempDir::new().unwrap();
    let (db, _) = setup(&temp_dir);
    let file = temp_dir.path().join("list.json");
    fs::write(&file, "[1, 2, 3]").unwrap();

    let output = run(
        temp_dir.path(),
        &["snapshot", "save", "--file", file.to_str().unwrap(), "--db", &db],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("data required"));

    let output = run(temp_dir.path(), &["snapshot", "latest", "--db", &db]);
    assert_eq!(stdout_json(&output), Value::Null);
}
