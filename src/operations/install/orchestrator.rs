//! Sequential installation of a plan
//!
//! Entries are installed one at a time, in plan order. The first failure stops the
//! run; packages installed before it stay installed.

use std::io::Write;

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

use super::plan::{InstallPlan, PlanEntry};
use crate::error::{PinenvError, Result, install};
use crate::installer::heuristics::is_hash_mismatch;
use crate::installer::{InstallFlags, InstallTarget, Installer, Source};
use crate::progress::ProgressDisplay;
use crate::runner::ProcessOutput;
use crate::temp::temp_dir_base;

/// How recorded hashes are enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashMode {
    /// Never enforce
    Ignore,
    /// Enforce when the entry has hashes, install unverified otherwise
    #[default]
    Prefer,
    /// Every registry entry must have hashes
    Require,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub hash_mode: HashMode,
    /// Let the installer pull in dependencies (skip-lock mode)
    pub expand_dependencies: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Installer,
    HashMismatch,
    MissingHash,
}

/// The entry that stopped the run, with the installer's output verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    pub package: String,
    pub kind: FailureKind,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InstallFailure {
    fn from_output(package: &str, output: ProcessOutput) -> Self {
        let kind = if is_hash_mismatch(&output.stdout) || is_hash_mismatch(&output.stderr) {
            FailureKind::HashMismatch
        } else {
            FailureKind::Installer
        };
        Self {
            package: package.to_string(),
            kind,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }

    pub fn into_error(self) -> PinenvError {
        match self.kind {
            FailureKind::Installer => {
                install::failed(self.package, self.exit_code, self.stdout, self.stderr)
            }
            FailureKind::HashMismatch => {
                install::hash_mismatch(self.package, self.exit_code, self.stdout, self.stderr)
            }
            FailureKind::MissingHash => install::missing_hash(self.package),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub failures: Vec<InstallFailure>,
    /// Entries after the failing one, never handed to the installer
    pub not_attempted: Vec<String>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The installed packages, or the first failure as an error
    pub fn into_result(self) -> Result<Vec<String>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(self.installed),
        }
    }
}

/// Install every entry of `plan`, stopping at the first failure
///
/// Errors running the installer itself (spawn failures, timeouts) are returned
/// directly; installer failures are recorded in the report.
pub fn install_all(
    plan: &InstallPlan,
    installer: &Installer<'_>,
    sources: &[Source],
    options: InstallOptions,
    progress: &ProgressDisplay,
) -> Result<InstallReport> {
    let mut report = InstallReport::default();
    let total = plan.len();

    for (index, entry) in plan.entries.iter().enumerate() {
        progress.update(&entry.package_name, index + 1, total);

        let failure = match enforce_hashes(entry, options.hash_mode) {
            Ok(enforce) => {
                let output = install_entry(entry, installer, sources, options, enforce)?;
                if output.success() {
                    debug!(package = %entry.package_name, "installed");
                    report.installed.push(entry.package_name.clone());
                    progress.inc();
                    continue;
                }
                info!(package = %entry.package_name, exit_code = output.exit_code, "installation failed");
                InstallFailure::from_output(&entry.package_name, output)
            }
            Err(failure) => failure,
        };

        report.failures.push(failure);
        report.not_attempted = remaining(plan, index);
        progress.abandon();
        return Ok(report);
    }

    progress.finish();
    Ok(report)
}

/// Whether hashes are enforced for `entry`, or why it cannot be installed
///
/// VCS entries never carry hashes and are never enforced.
fn enforce_hashes(entry: &PlanEntry, mode: HashMode) -> std::result::Result<bool, InstallFailure> {
    if entry.is_vcs {
        return Ok(false);
    }
    match mode {
        HashMode::Ignore => Ok(false),
        HashMode::Prefer => Ok(!entry.hashes.is_empty()),
        HashMode::Require if entry.hashes.is_empty() => Err(InstallFailure {
            package: entry.package_name.clone(),
            kind: FailureKind::MissingHash,
            exit_code: 1,
            stdout: String::new(),
            stderr: String::new(),
        }),
        HashMode::Require => Ok(true),
    }
}

fn install_entry(
    entry: &PlanEntry,
    installer: &Installer<'_>,
    sources: &[Source],
    options: InstallOptions,
    enforce: bool,
) -> Result<ProcessOutput> {
    let flags = InstallFlags {
        no_deps: !options.expand_dependencies,
        require_hashes: enforce,
        upgrade: false,
    };

    if !enforce {
        return installer.install_from_sources(&entry.target, sources, flags);
    }

    // Kept alive until the installer has read it
    let file = requirement_file(entry)?;
    let target = InstallTarget::RequirementFile(file.path().to_path_buf());
    installer.install_from_sources(&target, sources, flags)
}

/// A temporary requirement file holding `name==version --hash=...`
fn requirement_file(entry: &PlanEntry) -> Result<NamedTempFile> {
    let mut file = Builder::new()
        .prefix("pinenv-")
        .suffix("-requirement.txt")
        .tempfile_in(temp_dir_base())?;
    writeln!(file, "{}", entry.requirement_line())?;
    file.flush()?;
    Ok(file)
}

fn remaining(plan: &InstallPlan, failed_index: usize) -> Vec<String> {
    plan.entries[failed_index + 1..]
        .iter()
        .map(|entry| entry.package_name.clone())
        .collect()
}
