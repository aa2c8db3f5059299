//! End-to-end tests for the `ingestflow` binary.
//!
//! Each test runs the compiled binary inside a temp directory so that no
//! stray `ingestflow.toml` is picked up.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("should write fixture");
    path
}

fn ingestflow(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ingestflow"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("should run ingestflow binary")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stdout_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn test_detect_by_content_without_extension() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "upload", "name,age\nalice,30\n");

    let output = ingestflow(dir.path(), &["detect", "upload", "--output", "json"]);
    assert!(output.status.success(), "detect should succeed");

    let report = stdout_json(&output);
    assert_eq!(report["file_type"], "csv");
    assert_eq!(report["detected_by"], "content");
    assert_eq!(report["extension_allowed"], false);
}

#[test]
fn test_parse_ndjson_reports_events() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "events.ndjson", "{\"n\":1}\n\n{\"n\":2}\n{\"n\":3}\n");

    let output = ingestflow(
        dir.path(),
        &["parse", "events.ndjson", "--output", "json", "-n", "2"],
    );
    assert!(output.status.success(), "parse should succeed");

    let report = stdout_json(&output);
    assert_eq!(report["file_info"]["type"], "ndjson");
    assert_eq!(report["file_info"]["line_count"], 3);
    let events = report["events"].as_array().expect("events array");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["data"]["n"], 2);
}

#[test]
fn test_parse_failure_exit_code_and_message() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "bad.ndjson", "{\"a\":1}\n{\"b\":2}\n{oops\n");

    let output = ingestflow(dir.path(), &["parse", "bad.ndjson"]);
    assert_eq!(output.status.code(), Some(3), "parse errors exit with 3");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 3"), "stderr: {stderr}");
}

#[test]
fn test_parse_rejects_disallowed_extension() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "payload.exe", "{}\n");

    let output = ingestflow(dir.path(), &["parse", "payload.exe"]);
    assert_eq!(output.status.code(), Some(3));

    let forced = ingestflow(dir.path(), &["parse", "payload.exe", "--format", "ndjson"]);
    assert!(forced.status.success(), "forced format skips the allow-list");
}

#[test]
fn test_watch_streams_status_then_complete() {
    let dir = TempDir::new().expect("temp dir");
    write(
        &dir,
        "app.log",
        "2024-01-01T00:00:00Z INFO started\n2024-01-01T00:00:01Z WARN slow\n",
    );

    let output = ingestflow(dir.path(), &["watch", "app.log", "--job-id", "job-42"]);
    assert!(output.status.success(), "watch should succeed");

    let lines = stdout_lines(&output);
    assert!(lines.len() >= 2, "expected at least welcome and complete");
    assert_eq!(lines[0]["type"], "status");
    assert_eq!(lines[0]["data"]["processing_jobs"]["job-42"], "upload");

    let last = lines.last().expect("last line");
    assert_eq!(last["type"], "complete");
    assert_eq!(last["request_id"], "job-42");
    assert_eq!(last["data"]["total_events"], 2);
    assert_eq!(last["data"]["file_info"]["type"], "log");

    assert!(
        lines
            .iter()
            .filter(|l| l["type"] == "progress")
            .all(|l| l["request_id"] == "job-42")
    );
}

#[test]
fn test_watch_publishes_error() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rows.csv", "a,b,c\n1,2,3\n4,5\n");

    let output = ingestflow(dir.path(), &["watch", "rows.csv", "--job-id", "csv-job"]);
    assert_eq!(output.status.code(), Some(3));

    let lines = stdout_lines(&output);
    let last = lines.last().expect("last line");
    assert_eq!(last["type"], "error");
    assert_eq!(last["request_id"], "csv-job");
    assert_eq!(last["data"]["code"], "PARSE_ERROR");
    assert!(
        last["data"]["message"]
            .as_str()
            .expect("message")
            .contains("row 2")
    );
}

#[test]
fn test_config_validate_invalid_file() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "ingestflow.toml", "[hub]\nping_interval_secs = 0\n");

    let output = ingestflow(dir.path(), &["config", "validate", "--output", "json"]);
    assert_eq!(output.status.code(), Some(2));

    let report = stdout_json(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["source"], "ingestflow.toml");
}

#[test]
fn test_config_show_section_uses_defaults() {
    let dir = TempDir::new().expect("temp dir");

    let output = ingestflow(dir.path(), &["config", "show", "--section", "hub"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(defaults)"));
    assert!(stdout.contains("subscriber_queue_capacity = 256"));
}
