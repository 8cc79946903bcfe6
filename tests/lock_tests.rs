//! Integration tests for `pinenv lock`

#![cfg(unix)]

mod common;

use common::TestProject;
use predicates::prelude::*;

const PIPFILE: &str = r#"[[source]]
url = "https://pypi.org/simple"
verify_ssl = true
name = "pypi"

[packages]
requests = "*"

[dev-packages]
pytest = ">=2"
"#;

#[test]
fn test_lock_writes_pins_and_hashes() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);

    project
        .cmd()
        .arg("lock")
        .assert()
        .success()
        .stderr(predicate::str::contains("Locking"))
        .stderr(predicate::str::contains("Updated Pipfile.lock!"));

    let lock = project.lock_json();
    assert_eq!(lock["default"]["requests"]["version"], "==2.0.0");
    assert_eq!(lock["default"]["requests"]["hashes"][0], "sha256:abc123");
    assert_eq!(lock["develop"]["pytest"]["version"], "==2.0.0");
    assert_eq!(lock["_meta"]["host-environment-markers"]["sys_platform"], "linux");
    assert!(lock["_meta"]["hash"]["blake3"].is_string());
    assert!(project.read_file("Pipfile.lock").ends_with("}\n"));
}

#[test]
fn test_lock_is_deterministic() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);

    project.cmd().arg("lock").assert().success();
    let first = project.read_file("Pipfile.lock");
    project.cmd().arg("lock").assert().success();

    assert_eq!(project.read_file("Pipfile.lock"), first);
}

#[test]
fn test_lock_without_hashes() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);

    project.cmd().args(["lock", "--no-hashes"]).assert().success();

    let lock = project.lock_json();
    assert_eq!(lock["default"]["requests"]["version"], "==2.0.0");
    assert!(lock["default"]["requests"].get("hashes").is_none());
    assert!(!project.pip_log().contains("hash "));
}

#[test]
fn test_lock_requirements_output() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);

    project
        .cmd()
        .args(["lock", "-r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("requests==2.0.0 --hash=sha256:abc123"))
        .stdout(predicate::str::contains("pytest==2.0.0"))
        .stderr(predicate::str::contains("Pipfile.lock not found, creating..."));
}

#[test]
fn test_lock_requirements_reuses_fresh_lock() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);
    project.cmd().arg("lock").assert().success();
    let downloads = project.pip_log().matches("download").count();

    project
        .cmd()
        .args(["lock", "-r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("requests==2.0.0"));

    assert_eq!(project.pip_log().matches("download").count(), downloads);
}

#[test]
fn test_lock_requirements_relocks_stale_lock() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);
    project.cmd().arg("lock").assert().success();

    project.write_file("Pipfile", &PIPFILE.replace("requests = \"*\"", "requests = \"*\"\nflask = \"*\""));

    project
        .cmd()
        .args(["lock", "-r"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Pipfile.lock out of date, updating..."))
        .stdout(predicate::str::contains("flask==2.0.0"));
}

#[test]
fn test_lock_creates_pipfile() {
    let project = TestProject::new();

    project
        .cmd()
        .arg("lock")
        .assert()
        .success()
        .stderr(predicate::str::contains("Creating a Pipfile for this project..."));

    let pipfile = project.read_file("Pipfile");
    assert!(pipfile.contains("[[source]]"));
    assert!(pipfile.contains("https://pypi.org/simple"));
    assert!(project.file_exists("Pipfile.lock"));
}

#[test]
fn test_lock_imports_requirements_txt() {
    let project = TestProject::new();
    project.write_file(
        "requirements.txt",
        "# pinned by hand\nrequests>=1.0  # http\n\n-e git+https://github.com/org/lib.git#egg=lib\n",
    );

    project
        .cmd()
        .arg("lock")
        .assert()
        .success()
        .stderr(predicate::str::contains("Requirements file found"));

    let pipfile = project.read_file("Pipfile");
    assert!(pipfile.contains("requests = \">=1.0\""));
    assert!(pipfile.contains("lib"));
    let lock = project.lock_json();
    assert_eq!(lock["default"]["requests"]["version"], "==2.0.0");
    assert!(lock["default-vcs"]["lib"]["git"].is_string());
}

#[test]
fn test_lock_from_subdirectory() {
    let project = TestProject::new();
    project.write_file("Pipfile", PIPFILE);
    std::fs::create_dir_all(project.path.join("src/pkg")).unwrap();

    project
        .cmd()
        .current_dir(project.path.join("src/pkg"))
        .arg("lock")
        .assert()
        .success();

    assert!(project.file_exists("Pipfile.lock"));
    assert!(!project.file_exists("src/pkg/Pipfile"));
}
