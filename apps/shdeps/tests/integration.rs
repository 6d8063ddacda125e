//! Integration tests for shdeps CLI

use std::process::Command;

fn shdeps() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_shdeps"));
    command.env_remove("SHARED_DEPENDENCIES_CONFIG");
    command.env_remove("SHDEPS_LOG_LEVEL");
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn test_cli_version() {
    let output = shdeps()
        .arg("--version")
        .output()
        .expect("Failed to execute shdeps");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("shdeps"));
}

#[test]
fn test_cli_help() {
    let output = shdeps()
        .arg("--help")
        .output()
        .expect("Failed to execute shdeps");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Self-hosted mirror builder"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("--skip-mirror-url"));
}

#[test]
fn test_missing_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let output = shdeps()
        .current_dir(temp.path())
        .arg("does-not-exist.json")
        .output()
        .expect("Failed to execute shdeps");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn test_invalid_request_exits_before_any_work() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("shared-deps.json"),
        r#"{ "packages": [{ "name": "react", "versions": [{ "version": "not-semver" }] }] }"#,
    )
    .unwrap();

    let output = shdeps()
        .current_dir(temp.path())
        .output()
        .expect("Failed to execute shdeps");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("packages[0].versions[0].version"), "{stderr}");
    assert!(!temp.path().join("npm").exists());
}

#[test]
fn test_empty_build_succeeds() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("shared-deps.toml"),
        "outputDir = \"mirror\"\npackages = []\n",
    )
    .unwrap();

    let output = shdeps()
        .current_dir(temp.path())
        .args(["build", "--generate-dockerfile"])
        .output()
        .expect("Failed to execute shdeps");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Building 0 packages concurrently"));
    assert!(stderr.contains("Creating mirror/Dockerfile"));
    assert!(stderr.contains("Finished build in"));
    assert!(temp.path().join("mirror/Dockerfile").is_file());
}
