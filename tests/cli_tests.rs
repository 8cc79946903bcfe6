//! CLI integration tests using the REAL pinenv binary

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn pinenv_cmd() -> Command {
    Command::cargo_bin("pinenv").unwrap()
}

#[test]
fn test_help_output() {
    pinenv_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipfile"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("lock"))
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_version_output() {
    pinenv_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pinenv"));
}

#[test]
fn test_install_help_lists_examples() {
    pinenv_cmd()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLES:"))
        .stdout(predicate::str::contains("--skip-lock"))
        .stdout(predicate::str::contains("--ignore-pipfile"));
}

#[test]
fn test_missing_subcommand_fails() {
    pinenv_cmd().assert().failure();
}

#[test]
fn test_conflicting_interpreter_flags() {
    pinenv_cmd()
        .args(["install", "--three", "--two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_uninstall_all_conflicts_with_packages() {
    pinenv_cmd()
        .args(["uninstall", "--all", "requests"])
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    pinenv_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pinenv"));
}

#[test]
fn test_completions_unknown_shell() {
    pinenv_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completions_need_no_project() {
    let project = common::TestProject::without_env();
    project
        .cmd()
        .args(["completions", "zsh"])
        .assert()
        .success();
    assert!(!project.file_exists("Pipfile"));
}
