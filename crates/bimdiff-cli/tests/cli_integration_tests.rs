//! CLI integration tests
//!
//! Each test writes snapshot files into a temp directory and runs the
//! `bimdiff` binary against them.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

/// v1: a wall and a slab. v2: taller wall, slab gone, door added.
fn setup_versions(dir: &TempDir) -> (PathBuf, PathBuf) {
    let v1 = write_json(
        dir,
        "v1.json",
        &json!({
            "versionId": "v1",
            "elements": [
                {"expressId": 10, "type": "IfcWall", "globalId": "w1", "name": "North",
                 "properties": {"Height": 3.0, "FireRating": "EI60"}},
                {"expressId": 20, "type": "IfcSlab", "globalId": "s1",
                 "properties": {"Thickness": 0.25}}
            ]
        }),
    );
    let v2 = write_json(
        dir,
        "v2.json",
        &json!({
            "versionId": "v2",
            "elements": [
                {"expressId": 10, "type": "IfcWall", "globalId": "w1", "name": "North",
                 "properties": {"Height": 3.5, "FireRating": "EI60"}},
                {"expressId": 30, "type": "IfcDoor", "globalId": "d1"}
            ]
        }),
    );
    (v1, v2)
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bimdiff"))
        .current_dir(dir.path())
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_diff_json() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(&temp_dir, &["diff", "v1.json", "v2.json"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let result = stdout_json(&output);
    assert_eq!(result["identity"]["oldVersionId"], "v1");
    assert_eq!(result["identity"]["newVersionId"], "v2");
    assert_eq!(result["statistics"]["totalChanges"], 3);
    assert_eq!(result["added"][0]["globalId"], "d1");
    assert_eq!(result["removed"][0]["type"], "IfcSlab");

    let changes = result["modified"][0]["propertyChanges"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["propertyName"], "Height");
    assert_eq!(changes[0]["oldValue"], 3.0);
    assert_eq!(changes[0]["newValue"], 3.5);
}

#[test]
fn test_cli_diff_summary() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(
        &temp_dir,
        &["diff", "v1.json", "v2.json", "--format", "summary"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Model Comparison"));
    assert!(stdout.contains("### Removed (1)"));
    assert!(stdout.contains("### Modified (1)"));
    assert!(stdout.contains("### Added (1)"));
}

#[test]
fn test_cli_diff_same_file_twice_is_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(&temp_dir, &["diff", "v1.json", "v1.json"]);

    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["statistics"]["totalChanges"], 0);
}

#[test]
fn test_cli_diff_strict_rejects_duplicate_identity() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);
    write_json(
        &temp_dir,
        "dup.json",
        &json!({
            "versionId": "dup",
            "elements": [
                {"expressId": 1, "type": "IfcWall", "globalId": "w1"},
                {"expressId": 2, "type": "IfcWall", "globalId": "w1"}
            ]
        }),
    );

    let lenient = run(&temp_dir, &["diff", "v1.json", "dup.json"]);
    assert!(lenient.status.success());
    assert_eq!(stdout_json(&lenient)["warnings"].as_array().unwrap().len(), 1);

    let strict = run(&temp_dir, &["diff", "v1.json", "dup.json", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&strict.stderr).contains("ERR_AMBIGUOUS_IDENTITY"));
}

#[test]
fn test_cli_critical_reports_removed_structure() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(&temp_dir, &["critical", "v1.json", "v2.json"]);

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["highSeverity"], 1);
    assert_eq!(report["summary"]["mediumSeverity"], 1);
    assert_eq!(report["criticalChanges"][0]["severity"], "HIGH");
    assert_eq!(report["criticalChanges"][0]["changeType"], "removed");

    // HIGH severity triggers the stderr alert
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("critical: 1 high severity change(s) between v1 and v2"));
}

#[test]
fn test_cli_critical_honours_config() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);
    fs::write(
        temp_dir.path().join("bimdiff.toml"),
        "[critical]\ncritical_types = [\"IfcDoor\"]\n",
    )
    .unwrap();

    let output = run(
        &temp_dir,
        &["critical", "v1.json", "v2.json", "--config", "bimdiff.toml"],
    );

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["totalCritical"], 1);
    assert_eq!(report["summary"]["lowSeverity"], 1);
    assert!(output.stderr.is_empty());
}

#[test]
fn test_cli_matrix_with_heatmap() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(
        &temp_dir,
        &["matrix", "v1.json", "v2.json", "v1.json", "--heatmap"],
    );

    assert!(output.status.success());
    let outcome = stdout_json(&output);
    let ids = outcome["result"]["versionIds"].as_array().unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(outcome["result"]["matrix"][0][1]["totalChanges"], 3);
    assert_eq!(outcome["result"]["matrix"][0][2]["totalChanges"], 0);
    assert_eq!(outcome["heatmap"][0][0], 0.0);
    assert_eq!(outcome["heatmap"][0][1], 1.0);
}

#[test]
fn test_cli_matrix_sequential_without_heatmap() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(
        &temp_dir,
        &["matrix", "v1.json", "v2.json", "--sequential"],
    );

    assert!(output.status.success());
    let result = stdout_json(&output);
    assert!(result.get("heatmap").is_none());
    assert_eq!(result["summary"]["totalComparisons"], 2);
    assert_eq!(result["summary"]["maxChanges"], 3);
}

#[test]
fn test_cli_missing_file_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);

    let output = run(&temp_dir, &["diff", "v1.json", "nope.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error:"));
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_cli_invalid_config_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);
    fs::write(
        temp_dir.path().join("bad.toml"),
        "[critical]\nmax_listed = 0\n",
    )
    .unwrap();

    let output = run(
        &temp_dir,
        &["diff", "v1.json", "v2.json", "--config", "bad.toml"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_CONFIG"));
}

#[test]
fn test_cli_conflicting_version_ids_rejected() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(&temp_dir);
    write_json(
        &temp_dir,
        "impostor.json",
        &json!({"versionId": "v1", "elements": []}),
    );

    let output = run(&temp_dir, &["diff", "v1.json", "impostor.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate versionId 'v1'"));
}
