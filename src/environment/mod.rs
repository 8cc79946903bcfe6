//! Isolated target environments
//!
//! This module handles:
//! - Locating executables inside an environment
//! - Creating environments through the environment manager (`virtualenv`)
//! - Removing environments
//! - Probing the host environment markers of an environment's interpreter (see
//!   [`markers`])
//!
//! Creation is guarded by a [`Transaction`]: a failed, timed out or interrupted run
//! leaves no directory behind.

pub mod markers;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::error::{PinenvError, Result, environment};
use crate::runner::{CommandSpec, ProcessOutput, ProcessRunner};
use crate::transaction::Transaction;

/// Directory holding executables inside an environment
#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

/// A target environment on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    location: PathBuf,
}

impl Environment {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn exists(&self) -> bool {
        self.location.is_dir()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.location.join(BIN_DIR)
    }

    /// Path of `command` inside the environment
    pub fn which(&self, command: &str) -> PathBuf {
        let path = self.bin_dir().join(command);
        if cfg!(windows) {
            path.with_extension("exe")
        } else {
            path
        }
    }

    pub fn python(&self) -> PathBuf {
        self.which("python")
    }
}

/// Creates and removes environments
pub struct EnvironmentManager<'a> {
    runner: &'a dyn ProcessRunner,
    program: String,
    timeout: Duration,
}

impl<'a> EnvironmentManager<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    /// Argv for creating `env`
    pub fn create_command(&self, env: &Environment, prompt: &str, python: Option<&str>) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program)
            .arg(env.location())
            .arg(format!("--prompt=({})", prompt))
            .timeout(self.timeout)
            .interactive(true);
        if let Some(python) = python {
            spec = spec.arg("-p").arg(python);
        }
        spec
    }

    /// Create `env`, returning the manager's output for display
    ///
    /// On any failure the partially created directory is removed.
    pub fn create(
        &self,
        env: &Environment,
        prompt: &str,
        python: Option<&str>,
    ) -> Result<ProcessOutput> {
        let path = env.location().display().to_string();
        info!(path = %path, "creating environment");

        let mut transaction = Transaction::new();
        if !env.exists() {
            transaction.track_dir_created(env.location());
        }

        let output = match self.runner.run(&self.create_command(env, prompt, python)) {
            Ok(output) => output,
            Err(PinenvError::ProcessInterrupted { .. }) => {
                return Err(environment::interrupted(path));
            }
            Err(e) => return Err(e),
        };

        if !output.success() {
            let reason = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.stderr.trim().to_string()
            };
            return Err(environment::creation_failed(path, reason));
        }

        transaction.commit();
        Ok(output)
    }

    /// Delete `env` from disk; a missing environment is not an error
    pub fn remove(&self, env: &Environment) -> Result<()> {
        if !env.exists() {
            return Ok(());
        }
        info!(path = %env.location().display(), "removing environment");
        fs::remove_dir_all(env.location()).map_err(|e| {
            environment::removal_failed(env.location().display().to_string(), e.to_string())
        })
    }
}
