//! Integration tests for the nx-deploy CLI surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WHEEL_OLD: &str = "nx_workers-1.0.0-py3-none-any.whl";
const WHEEL_NEW: &str = "nx_workers-1.2.0-py3-none-any.whl";

/// Binary with a private config path and no inherited `NX_DEPLOY_*` overrides.
fn nx_deploy(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nx-deploy"));
    cmd.env("NO_COLOR", "1")
        .env("NX_DEPLOY_CONFIG", config_dir.path().join("config.yaml"));
    for var in [
        "NX_DEPLOY_HOST",
        "NX_DEPLOY_REMOTE_DIR",
        "NX_DEPLOY_ENV_PATH",
        "NX_DEPLOY_INTERPRETER_GLOB",
        "NX_DEPLOY_ARTIFACT_DIR",
        "NX_DEPLOY_PATTERN",
        "NX_DEPLOY_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn release_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for name in [WHEEL_OLD, WHEEL_NEW, "nx_workers-1.2.0.tar.gz"] {
        std::fs::write(dir.path().join(name), b"wheel").expect("write artifact");
    }
    dir
}

// --- Help and version ---

#[test]
fn test_help_lists_commands_and_overrides() {
    let cfg = TempDir::new().expect("temp dir");
    nx_deploy(&cfg)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--interpreter-glob"));
}

#[test]
fn test_version_flag_shows_version() {
    let cfg = TempDir::new().expect("temp dir");
    nx_deploy(&cfg)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nx-deploy"));
}

#[test]
fn test_version_command_shows_version() {
    let cfg = TempDir::new().expect("temp dir");
    nx_deploy(&cfg)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "nx-deploy v{}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    let cfg = TempDir::new().expect("temp dir");
    for value in ["1", "true", "yes", "", "0"] {
        nx_deploy(&cfg)
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("nx-deploy v"));
    }
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let cfg = TempDir::new().expect("temp dir");
    let output = nx_deploy(&cfg)
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let cfg = TempDir::new().expect("temp dir");
    nx_deploy(&cfg)
        .arg("rollback")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Artifact lookup ---

#[test]
fn test_no_artifact_exits_one_with_message() {
    let cfg = TempDir::new().expect("temp dir");
    let empty = TempDir::new().expect("temp dir");
    nx_deploy(&cfg)
        .arg("--artifact-dir")
        .arg(empty.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No artifact matching 'nx_workers-*.whl'"));
}

#[test]
fn test_no_artifact_json_error_document() {
    let cfg = TempDir::new().expect("temp dir");
    let empty = TempDir::new().expect("temp dir");
    let output = nx_deploy(&cfg)
        .args(["deploy", "--json", "--artifact-dir"])
        .arg(empty.path())
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "ARTIFACT_NOT_FOUND");
}

#[test]
fn test_artifact_dir_from_environment() {
    let cfg = TempDir::new().expect("temp dir");
    let dist = release_dir();
    nx_deploy(&cfg)
        .env("NX_DEPLOY_ARTIFACT_DIR", dist.path())
        .args(["deploy", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(WHEEL_NEW));
}

// --- Dry run ---

#[test]
fn test_dry_run_prints_selection_and_script() {
    let cfg = TempDir::new().expect("temp dir");
    let dist = release_dir();
    nx_deploy(&cfg)
        .args(["deploy", "--dry-run", "--host", "deploy@sensor-3", "--artifact-dir"])
        .arg(dist.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("deploy@sensor-3:/tmp/{WHEEL_NEW}")))
        .stdout(predicate::str::contains("set -e"))
        .stdout(predicate::str::contains(format!(
            "python -m pip install --upgrade /tmp/{WHEEL_NEW}"
        )))
        .stdout(predicate::str::contains(WHEEL_OLD).not());
}

#[test]
fn test_dry_run_json_contains_plan() {
    let cfg = TempDir::new().expect("temp dir");
    let dist = release_dir();
    let output = nx_deploy(&cfg)
        .args(["deploy", "--dry-run", "--json", "--pattern", "nx_workers-1.0.*.whl", "--artifact-dir"])
        .arg(dist.path())
        .output()
        .expect("run");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["artifact"]["file_name"], WHEEL_OLD);
    assert_eq!(value["destination"], format!("nx:/tmp/{WHEEL_OLD}"));
    assert!(
        value["script"]
            .as_str()
            .is_some_and(|s| s.contains("ln -sf /usr/bin/python3.*[0-9] /opt/nx/venv/bin/"))
    );
}

#[test]
fn test_invalid_override_is_rejected_before_lookup() {
    let cfg = TempDir::new().expect("temp dir");
    let dist = release_dir();
    nx_deploy(&cfg)
        .args(["deploy", "--dry-run", "--env-path", "relative/venv", "--artifact-dir"])
        .arg(dist.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("env_path"));
}
