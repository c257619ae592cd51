//! End-to-end tests for the `ferret init` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ferret() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ferret"))
}

#[test]
fn init_creates_default_rules_file() {
    let dir = TempDir::new().unwrap();

    ferret()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("rules file created"));

    let rules = std::fs::read_to_string(dir.path().join("ferret-rules.yaml")).unwrap();
    assert!(rules.contains("group: credentials"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ferret-rules.yaml"), "rules: []").unwrap();

    ferret()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("ferret-rules.yaml")).unwrap(),
        "rules: []"
    );
}

#[test]
fn init_with_custom_path_writes_there() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("conf").join("my-rules.yaml");

    ferret().arg("init").arg("-r").arg(&target).assert().success();

    assert!(target.exists());
}

#[test]
fn initialised_rules_pass_their_own_self_test() {
    let dir = TempDir::new().unwrap();

    ferret().arg("init").current_dir(dir.path()).assert().success();
    ferret()
        .arg("test")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 failing"));
}
