use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LAYERED: &str = r#"
[[managers]]
name = "storage"

[[managers]]
name = "state"
dependencies = ["storage"]

[[managers]]
name = "cache"
dependencies = ["state"]
lazy = true
"#;

const CYCLIC: &str = r#"
[[managers]]
name = "alpha"
dependencies = ["beta"]

[[managers]]
name = "beta"
dependencies = ["alpha"]
"#;

fn manifest(dir: &TempDir, file_name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, contents).expect("write manifest");
    path
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("keel")?;
    cmd.arg("--ping");

    cmd.assert().success().stdout(predicate::str::contains("pong"));
    Ok(())
}

#[test]
fn test_no_args_prints_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("keel")?;

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("pong").not());
    Ok(())
}

#[test]
fn test_order_lists_eager_managers_then_lazy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.toml", LAYERED);

    Command::cargo_bin("keel")?
        .arg("order")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. storage\n2. state\nlazy: cache\n"));
    Ok(())
}

#[test]
fn test_order_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.toml", LAYERED);

    Command::cargo_bin("keel")?
        .args(["--json", "order"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"order":["storage","state"]}"#));
    Ok(())
}

#[test]
fn test_order_fails_on_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.toml", CYCLIC);

    Command::cargo_bin("keel")?
        .arg("order")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency"));
    Ok(())
}

#[test]
fn test_validate_reports_valid_manifest() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.json", r#"{"managers": [{"name": "storage"}, {"name": "state", "dependencies": ["storage"]}]}"#);

    Command::cargo_bin("keel")?
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("valid\n"));
    Ok(())
}

#[test]
fn test_validate_fails_on_missing_dependency() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.yaml", "managers:\n  - name: state\n    dependencies: [storage]\n");

    Command::cargo_bin("keel")?
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("'storage', which is not registered"));
    Ok(())
}

#[test]
fn test_graph_prints_dot() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.toml", LAYERED);

    Command::cargo_bin("keel")?
        .arg("graph")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph \"managers\""))
        .stdout(predicate::str::contains("\"cache\" [style=dashed];"))
        .stdout(predicate::str::contains("\"state\" -> \"storage\";"));
    Ok(())
}

#[test]
fn test_missing_manifest_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;

    Command::cargo_bin("keel")?
        .arg("order")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
    Ok(())
}

#[test]
fn test_invalid_log_level_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = manifest(&dir, "keel.toml", LAYERED);

    Command::cargo_bin("keel")?
        .args(["--log-level", "keel=loud", "order"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
    Ok(())
}
