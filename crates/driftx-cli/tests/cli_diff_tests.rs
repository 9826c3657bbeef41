//! CLI diff integration tests
//!
//! These tests drive the built `driftx` binary against export directories
//! laid out in a scratch directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn driftx(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_driftx"))
        .current_dir(dir)
        .env_remove("DRIFTX_EXPORTS_DIR")
        .env_remove("DRIFTX_CHANGE_LOG_DIR")
        .env_remove("DRIFTX_EXCLUDE")
        .env_remove("DRIFTX_LOG_PROFILE")
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn setup_exports(temp_dir: &TempDir) {
    let previous = temp_dir.path().join("previous");
    let current = temp_dir.path().join("current");

    write(
        &previous,
        "CompliancePolicies/a.json",
        r#"{"id": "a", "displayName": "A", "minLength": 8, "lastModifiedDateTime": "2024-01-01"}"#,
    );
    write(
        &previous,
        "CompliancePolicies/b.json",
        r#"{"id": "b", "displayName": "B", "minLength": 8}"#,
    );

    write(
        &current,
        "CompliancePolicies/a.json",
        r#"{"id": "a", "displayName": "A", "minLength": 8, "lastModifiedDateTime": "2024-02-02"}"#,
    );
    write(
        &current,
        "CompliancePolicies/b.json",
        r#"{"id": "b", "displayName": "B", "minLength": 12}"#,
    );
    write(
        &current,
        "CompliancePolicies/c.json",
        r#"{"id": "c", "displayName": "C"}"#,
    );
}

#[test]
fn test_cli_diff_prints_summary_and_writes_logs() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);

    let output = driftx(
        temp_dir.path(),
        &[
            "diff",
            "--previous",
            "previous",
            "--current",
            "current",
            "--output",
            "logs",
        ],
    );

    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "1 added, 0 removed, 1 modified"
    );

    let logs = temp_dir.path().join("logs");
    assert!(logs.join("latest.json").exists());
    let history: Vec<_> = fs::read_dir(&logs)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("changelog_"))
        .collect();
    assert_eq!(history.len(), 1);
}

#[test]
fn test_cli_diff_json_output() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);

    let output = driftx(
        temp_dir.path(),
        &[
            "diff",
            "--previous",
            "previous",
            "--current",
            "current",
            "--dry-run",
            "--json",
        ],
    );

    assert!(output.status.success());
    let log: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(log["added"][0]["objectId"], "c");
    assert_eq!(log["modified"][0]["objectId"], "b");
    assert_eq!(
        log["modified"][0]["changes"]["root['minLength']"],
        serde_json::json!({"old": 8, "new": 12})
    );
    assert!(!temp_dir.path().join("change_logs").exists());
}

#[test]
fn test_cli_diff_exclude_flag_is_appended() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);

    let output = driftx(
        temp_dir.path(),
        &[
            "diff",
            "--previous",
            "previous",
            "--current",
            "current",
            "--exclude",
            "minLength",
            "--dry-run",
        ],
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "1 added, 0 removed, 0 modified"
    );
}

#[test]
fn test_cli_diff_warns_on_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);
    write(
        &temp_dir.path().join("current"),
        "CompliancePolicies/broken.json",
        "{\"id\": ",
    );

    let output = driftx(
        temp_dir.path(),
        &[
            "diff",
            "--previous",
            "previous",
            "--current",
            "current",
            "--dry-run",
        ],
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning:"), "stderr: {}", stderr);
    assert!(stderr.contains("CompliancePolicies/broken.json"));
}

#[test]
fn test_cli_diff_invalid_pattern_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);

    let output = driftx(
        temp_dir.path(),
        &["diff", "--current", "current", "--exclude", "root['open"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_cli_diff_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    setup_exports(&temp_dir);
    fs::write(
        temp_dir.path().join("driftx.toml"),
        "[paths]\nexports = \"current\"\nchange_logs = \"from_config\"\n",
    )
    .unwrap();

    let output = driftx(temp_dir.path(), &["diff", "--previous", "previous"]);

    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(temp_dir
        .path()
        .join("from_config")
        .join("latest.json")
        .exists());
}

#[test]
fn test_cli_diff_without_current_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = driftx(temp_dir.path(), &["diff"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--current"));
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Repository with `exports/` below the top level; the committed role
/// differs from the working tree.
fn setup_export_repo(temp_dir: &TempDir) {
    let repo = temp_dir.path();
    git(repo, &["init", "-q"]);
    git(repo, &["config", "user.email", "exports@example.com"]);
    git(repo, &["config", "user.name", "Exports"]);
    git(repo, &["config", "commit.gpgsign", "false"]);

    write(repo, "README.md", "tenant exports");
    write(repo, "exports/Roles/r.json", r#"{"id": "r", "v": 1}"#);
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-q", "-m", "export"]);

    write(repo, "exports/Roles/r.json", r#"{"id": "r", "v": 2}"#);
}

#[test]
fn test_cli_diff_previous_rev_under_repo_subdirectory() {
    if !git_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    setup_export_repo(&temp_dir);

    for extra in [&[][..], &["--repo", "."][..], &["--repo", "exports"][..]] {
        let mut args = vec![
            "diff",
            "--current",
            "exports",
            "--previous-rev",
            "HEAD",
            "--dry-run",
        ];
        args.extend_from_slice(extra);
        let output = driftx(temp_dir.path(), &args);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "args {:?}. Stderr: {}", extra, stderr);
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            "0 added, 0 removed, 1 modified",
            "args {:?}",
            extra
        );
        assert!(!stderr.contains("warning:"), "args {:?}. Stderr: {}", extra, stderr);
    }
}
