//! Common test utilities for pinenv integration tests
//!
//! Projects get a `.venv` whose `pip` and `python` are shell scripts. The fake `pip`
//! appends every invocation to `.venv/pip.log`, serves `<name>-2.0.0` wheels for
//! `download`, reports `sha256:abc123` for `hash`, prints `.venv/freeze.txt` for
//! `freeze`, and fails any `install` that mentions a package named `broken`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_PIP: &str = r#"#!/bin/sh
here="$(cd "$(dirname "$0")/.." && pwd)"
echo "$*" >> "$here/pip.log"
case "$1" in
  download)
    req="$2"
    dest=""
    while [ $# -gt 0 ]; do
      if [ "$1" = "-d" ]; then dest="$2"; fi
      shift
    done
    name=$(echo "$req" | sed 's/[<>=!~ ;\[].*//')
    file="$name-2.0.0-py3-none-any.whl"
    : > "$dest/$file"
    echo "Collecting $req"
    echo "  Saved ./$file"
    ;;
  hash)
    echo "$2:"
    echo "--hash=sha256:abc123"
    ;;
  install)
    case "$*" in
      *broken*)
        echo "Collecting broken"
        echo "ERROR: No matching distribution found for broken" >&2
        exit 3
        ;;
    esac
    for arg in "$@"; do
      if [ -f "$arg" ]; then cat "$arg" >> "$here/requirements.log"; fi
    done
    echo "Successfully installed"
    ;;
  freeze)
    if [ -f "$here/freeze.txt" ]; then cat "$here/freeze.txt"; fi
    ;;
  uninstall)
    echo "Successfully uninstalled $2"
    ;;
esac
exit 0
"#;

const FAKE_PYTHON: &str = r#"#!/bin/sh
echo '{"os_name": "posix", "python_version": "3.11", "sys_platform": "linux"}'
"#;

const FAKE_VIRTUALENV: &str = r#"#!/bin/sh
tools="$(cd "$(dirname "$0")" && pwd)"
mkdir -p "$1/bin"
cp "$tools/pip" "$1/bin/pip"
cp "$tools/python" "$1/bin/python"
echo "created virtual environment in $1"
"#;

/// A temporary project directory with a fake environment
pub struct TestProject {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Project root
    pub path: PathBuf,
    /// Directory holding the fake tools used to create environments
    pub tools: PathBuf,
}

impl TestProject {
    /// Empty project with its `.venv` already in place
    pub fn new() -> Self {
        let project = Self::without_env();
        project.install_env();
        project
    }

    /// Empty project with no environment yet
    pub fn without_env() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        let tools = temp.path().join("tools");
        std::fs::create_dir_all(&path).expect("Failed to create project directory");
        std::fs::create_dir_all(&tools).expect("Failed to create tools directory");

        write_script(&tools.join("pip"), FAKE_PIP);
        write_script(&tools.join("python"), FAKE_PYTHON);
        write_script(&tools.join("virtualenv"), FAKE_VIRTUALENV);

        Self { temp, path, tools }
    }

    fn install_env(&self) {
        let bin = self.path.join(".venv").join("bin");
        std::fs::create_dir_all(&bin).expect("Failed to create environment");
        write_script(&bin.join("pip"), FAKE_PIP);
        write_script(&bin.join("python"), FAKE_PYTHON);
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Packages the environment claims to have installed
    pub fn set_freeze(&self, content: &str) {
        self.write_file(".venv/freeze.txt", content);
    }

    /// Every fake `pip` invocation so far, one per line
    pub fn pip_log(&self) -> String {
        std::fs::read_to_string(self.path.join(".venv").join("pip.log")).unwrap_or_default()
    }

    /// Contents of every requirement file passed to `pip install`
    pub fn installed_requirements(&self) -> String {
        std::fs::read_to_string(self.path.join(".venv").join("requirements.log"))
            .unwrap_or_default()
    }

    pub fn lock_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.read_file("Pipfile.lock")).expect("Pipfile.lock is not JSON")
    }

    /// Replace one of the fake tools used to create environments
    pub fn write_tool(&self, name: &str, content: &str) {
        write_script(&self.tools.join(name), content);
    }

    /// `pinenv` running in this project, isolated from the user's settings
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pinenv").unwrap();
        cmd.current_dir(&self.path)
            .env_remove("PINENV_PROJECT")
            .env_remove("RUST_LOG")
            .envs(self.isolated_env());
        cmd
    }

    /// Like [`TestProject::cmd`], for tests that must spawn and signal the process
    pub fn spawnable_cmd(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_pinenv"));
        cmd.current_dir(&self.path)
            .env_remove("PINENV_PROJECT")
            .env_remove("RUST_LOG")
            .envs(self.isolated_env())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        cmd
    }

    fn isolated_env(&self) -> Vec<(&'static str, std::ffi::OsString)> {
        vec![
            ("PINENV_SKIP_VALIDATION", "1".into()),
            ("PINENV_VENV_IN_PROJECT", "1".into()),
            ("PINENV_NO_PROGRESS", "1".into()),
            ("PINENV_COLORBLIND", "1".into()),
            ("PINENV_ENV_MANAGER", self.tools.join("virtualenv").into_os_string()),
        ]
    }
}

fn write_script(path: &Path, content: &str) {
    std::fs::write(path, content).expect("Failed to write script");
    let mut perms = std::fs::metadata(path)
        .expect("Failed to stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("Failed to make script executable");
}
