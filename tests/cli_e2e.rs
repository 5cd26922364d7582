//! CLI end-to-end tests.
//!
//! These spawn the actual `getterguard` binary and validate stdout and exit
//! codes.
//!
//! Exit code expectations:
//! - 0: No findings
//! - 1: Findings reported
//! - 2: Invalid arguments (bad config)
//! - 3: Resolution error (missing path, only unparseable files)

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const MESSAGES: &str = "// Code generated by protoc-gen-go. DO NOT EDIT.

package pb

type User struct {
\tName string
}

func (x *User) ProtoReflect() {}

func (x *User) GetName() string {
\tif x != nil {
\t\treturn x.Name
\t}
\treturn \"\"
}
";

const SERVICE: &str = "package svc

import \"example.com/app/pb\"

func greet(u *pb.User) string {
\treturn \"hello \" + u.Name
}
";

/// Run getterguard in `dir` and return (stdout, stderr, exit_code).
fn run_guard(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_getterguard"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute getterguard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path: PathBuf = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn service_workspace() -> TempDir {
    workspace(&[("pb/user.pb.go", MESSAGES), ("svc/greet.go", SERVICE)])
}

// ============================================================================
// check
// ============================================================================

#[test]
fn diagnostic_mode_prints_locations() {
    let dir = service_workspace();
    let (stdout, _stderr, exit_code) = run_guard(dir.path(), &["check"]);

    assert_eq!(exit_code, 1, "stdout: {}", stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(
        "greet.go:6:20: avoid direct access to proto field \"u.Name\" use \"u.GetName()\""
    ));
}

#[test]
fn issues_mode_emits_json() {
    let dir = service_workspace();
    let (stdout, _stderr, exit_code) = run_guard(dir.path(), &["check", "--mode", "issues", "."]);

    assert_eq!(exit_code, 1);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["files_checked"], 2);
    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["pos"]["line"], 6);
    assert_eq!(issues[0]["inline_fix"]["start_col"], 19);
    assert_eq!(issues[0]["inline_fix"]["length"], 6);
    assert_eq!(issues[0]["inline_fix"]["new_string"], "u.GetName()");
}

#[test]
fn fix_rewrites_and_second_run_is_clean() {
    let dir = service_workspace();
    let (_stdout, _stderr, exit_code) = run_guard(dir.path(), &["check", "--fix"]);
    assert_eq!(exit_code, 1);

    let fixed = fs::read_to_string(dir.path().join("svc/greet.go")).unwrap();
    assert!(fixed.contains("return \"hello \" + u.GetName()"));

    let (stdout, _stderr, exit_code) = run_guard(dir.path(), &["check"]);
    assert_eq!(exit_code, 0, "stdout: {}", stdout);
    assert!(stdout.is_empty());
}

#[test]
fn config_file_changes_accessor_prefix() {
    let messages = MESSAGES.replace("GetName", "FetchName");
    let service = workspace(&[
        ("pb/user.pb.go", messages.as_str()),
        ("svc/greet.go", SERVICE),
        ("getterguard.toml", "[getterguard]\naccessor_prefix = \"Fetch\"\n"),
    ]);
    let (stdout, _stderr, exit_code) = run_guard(service.path(), &["check"]);
    assert_eq!(exit_code, 1);
    assert!(stdout.contains("use \"u.FetchName()\""));
}

#[test]
fn invalid_config_returns_exit_2() {
    let dir = service_workspace();
    fs::write(dir.path().join("bad.toml"), "[getterguard]\naccessor_prefix = \"\"\n").unwrap();
    let (stdout, _stderr, exit_code) = run_guard(dir.path(), &["check", "--config", "bad.toml"]);

    assert_eq!(exit_code, 2);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 2);
}

#[test]
fn missing_path_returns_exit_3() {
    let dir = service_workspace();
    let (stdout, _stderr, exit_code) = run_guard(dir.path(), &["check", "no/such/dir"]);

    assert_eq!(exit_code, 3);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn unparseable_file_is_reported_but_not_fatal() {
    let dir = workspace(&[
        ("pb/user.pb.go", MESSAGES),
        ("svc/greet.go", SERVICE),
        ("svc/broken.go", "package svc\n\nfunc broken( {\n"),
    ]);
    let (stdout, stderr, exit_code) = run_guard(dir.path(), &["check", "--mode", "issues"]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("recovered from syntax errors"));
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["files_checked"], 3);
    assert_eq!(json["issues"].as_array().unwrap().len(), 1);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], 3);
    assert!(errors[0]["details"]["file"]
        .as_str()
        .unwrap()
        .ends_with("broken.go"));
}

#[test]
fn undecodable_file_is_reported_but_not_fatal() {
    let dir = service_workspace();
    fs::write(dir.path().join("svc/latin1.go"), b"package svc\n// caf\xe9\n").unwrap();
    let (stdout, stderr, exit_code) = run_guard(dir.path(), &["check", "--mode", "issues"]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("skipping unreadable file"));
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["files_checked"], 2);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], 3);
    assert!(errors[0]["details"]["file"]
        .as_str()
        .unwrap()
        .ends_with("latin1.go"));
}

#[test]
fn only_unparseable_files_returns_exit_3() {
    let dir = workspace(&[("broken.go", "package\n")]);
    let (_stdout, stderr, exit_code) = run_guard(dir.path(), &["check"]);
    assert_eq!(exit_code, 3);
    assert!(stderr.contains("skipping unparseable file"));
}
