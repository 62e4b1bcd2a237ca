//! CLI regression tests for the `rampart` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes and output formats.
//!
//! Run with: `cargo test -p rampart-test`
//! Requires the `rampart` binary to be built first (`cargo build -p rampart`).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `rampart` binary.
fn rampart() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("rampart")
        .expect("rampart binary not found, run `cargo build -p rampart` first");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/rampart-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("route table written");
    serde_json::from_str(&content).expect("route table is JSON")
}

// ---------------------------------------------------------------------------
// rampart validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_schema_exits_zero() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .assert()
        .success()
        .stderr(contains("valid"));
}

#[test]
fn validate_parse_error_exits_one() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("invalid-parse-error.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2001"));
}

#[test]
fn validate_missing_file_exits_one() {
    rampart()
        .args(["validate", "--schema", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("failed to read"));
}

#[test]
fn validate_without_schema_exits_one() {
    rampart()
        .env_remove("RAMPART_SCHEMA")
        .env_remove("RAMPART_MANIFEST")
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("no schema files"));
}

#[test]
fn validate_get_with_body_exits_one() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("invalid-get-body.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E4003"))
        .stderr(contains(".echo.EchoService.Get"));
}

#[test]
fn validate_extension_mismatch_exits_one() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("invalid-extension.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2005"));
}

#[test]
fn validate_route_conflict_is_a_warning() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("conflicting-routes.yaml"))
        .assert()
        .success()
        .stderr(contains("E4101"));
}

#[test]
fn validate_unused_selector_is_a_warning() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .arg("--rules")
        .arg(fixtures().join("unused-selector.yaml"))
        .assert()
        .success()
        .stderr(contains("E4100"));
}

#[test]
fn validate_json_format_outputs_valid_json() {
    let output = rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    let v: serde_json::Value =
        serde_json::from_str(&s).expect("--format json output should be valid JSON");
    assert_eq!(v["valid"], true);
    assert_eq!(v["summary"]["services"], 2);
    assert_eq!(v["summary"]["methods"], 6);
    assert_eq!(v["summary"]["routes"], 5);
}

#[test]
fn validate_json_format_invalid_schema_exits_one_with_json() {
    let output = rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("invalid-get-body.yaml"))
        .args(["--format", "json"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    let v: serde_json::Value =
        serde_json::from_str(&s).expect("--format json output should be valid JSON even on error");
    assert_eq!(v["valid"], false);
    let errors = v["errors"].as_array().expect("errors should be an array");
    assert_eq!(errors[0]["code"], "E4003");
    assert!(v.get("summary").is_none());
}

#[test]
fn validate_rejects_unknown_format() {
    rampart()
        .args(["validate", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2);
}

// ---------------------------------------------------------------------------
// rampart compile
// ---------------------------------------------------------------------------

#[test]
fn compile_missing_output_flag_exits_two() {
    rampart()
        .args(["compile", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn compile_writes_route_table() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    rampart()
        .args(["compile", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("5 routes"));

    let table = read_json(&output);
    assert_eq!(table["route_table_version"], 1);
    assert_eq!(table["routes_count"], 5);
    assert_eq!(table["sources"][0]["sha256"].as_str().map(str::len), Some(64));

    let instances = &table["services"][0];
    assert_eq!(instances["name"], "InstanceService");
    let show = &instances["methods"][1]["bindings"][0];
    assert_eq!(show["method"], "GET");
    assert_eq!(show["template"], "/compute/v1/instances/{UID}");
    let reboot = &instances["methods"][2]["bindings"][0];
    assert_eq!(reboot["method"], "POST");
    assert_eq!(
        reboot["template"],
        "/compute/v1/instances/{metadata.uid}/reboot"
    );

    let create = &table["services"][1]["methods"][0];
    assert_eq!(create["bindings"][0]["body"], "spec");
    assert_eq!(create["bindings"][1]["index"], 1);
    assert_eq!(create["bindings"][1]["body"], "*");
}

#[test]
fn compile_with_manifest() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    rampart()
        .args(["compile", "--manifest"])
        .arg(fixtures().join("rampart.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let table = read_json(&output);
    // Resize via override rule, Sync via fallback
    assert_eq!(table["routes_count"], 7);
    assert_eq!(table["sources"].as_array().map(Vec::len), Some(2));

    let resize = &table["services"][0]["methods"][3]["bindings"][0];
    assert_eq!(resize["method"], "PATCH");
    assert_eq!(resize["body"], "spec");

    let sync = &table["services"][1]["methods"][1]["bindings"][0];
    assert_eq!(sync["template"], "/compute.v1.SnapshotService/Sync");
    assert_eq!(sync["body"], "*");
}

#[test]
fn compile_standalone_flag() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    rampart()
        .args(["compile", "--standalone", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let table = read_json(&output);
    assert_eq!(table["services"][0]["name"], "compute.v1.InstanceService");
}

#[test]
fn compile_generate_unbound_methods_from_env() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    rampart()
        .env("RAMPART_GENERATE_UNBOUND_METHODS", "true")
        .args(["compile", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let table = read_json(&output);
    // Resize and Sync fall back to POST /<service>/<method>
    assert_eq!(table["routes_count"], 7);
}

#[test]
fn compile_invalid_schema_exits_one() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    rampart()
        .args(["compile", "--schema"])
        .arg(fixtures().join("invalid-get-body.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("error: compilation failed"));

    assert!(!output.exists(), "no route table on failure");
}

#[test]
fn compile_nonexistent_schema_exits_one() {
    let tmp = TempDir::new().expect("temp dir");

    rampart()
        .args(["compile", "--schema", "nonexistent.yaml", "--output"])
        .arg(tmp.path().join("routes.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("nonexistent.yaml"));
}

#[test]
fn compile_json_logs_go_to_stderr() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("routes.json");

    let assert = rampart()
        .args(["--log-format", "json", "--log-level", "info", "compile", "--schema"])
        .arg(fixtures().join("compute.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("\"event\":\"routes_written\""));

    assert!(assert.get_output().stdout.is_empty());
}
