//! Install operation submodules
//!
//! - [`plan`]: What to install, from the lock, the manifest, or the command line
//! - [`orchestrator`]: Sequential, fail-fast installation of a plan
//!
//! This module ties them to the project: [`do_init`] installs everything the project
//! declares and [`install_packages`] adds new packages to it.

pub mod orchestrator;
pub mod plan;

use console::Style;
use tracing::info;

use super::ProjectContext;
use super::lock::{do_lock, ensure_lock};
use crate::error::Result;
use crate::manifest::{DependencyConstraint, DependencyGroup, Manifest, ManifestStore};

pub use orchestrator::{HashMode, InstallOptions, install_all};
pub use plan::InstallPlan;

/// Options for installing the whole project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Include `dev-packages`
    pub dev: bool,
    /// Install straight from the manifest, letting the installer resolve
    pub skip_lock: bool,
    /// Trust an existing lock even if the manifest changed since
    pub ignore_manifest: bool,
    /// Install into the interpreter on PATH instead of the project environment
    pub system: bool,
    pub hash_mode: HashMode,
    /// Record hashes when a new lock has to be written
    pub want_hashes: bool,
}

/// Install everything the project declares
///
/// The lock is written first when it is missing or stale, unless the lock is skipped.
pub fn do_init(ctx: &ProjectContext<'_>, manifest: &Manifest, options: InitOptions) -> Result<()> {
    let plan = if options.skip_lock {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Installing dependencies from Pipfile...")
        );
        InstallPlan::from_manifest(manifest, options.dev)?
    } else {
        let lock = ensure_lock(ctx, manifest, options.want_hashes, options.ignore_manifest)?;
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Installing dependencies from Pipfile.lock...")
        );
        InstallPlan::from_lock(&lock, options.dev)
    };

    info!(count = plan.len(), "installing");
    let install_options = InstallOptions {
        hash_mode: if options.skip_lock {
            HashMode::Ignore
        } else {
            options.hash_mode
        },
        expand_dependencies: options.skip_lock,
    };
    let progress = ctx.progress(plan.len());
    let report = install_all(
        &plan,
        &ctx.installer(options.system),
        &manifest.sources(),
        install_options,
        &progress,
    )?;
    report.into_result()?;

    if !options.system {
        eprintln!(
            "To activate this project's virtualenv, run: {}",
            Style::new().red().apply_to(format!(
                "source {}",
                ctx.project.env.bin_dir().join("activate").display()
            ))
        );
    }
    Ok(())
}

/// Options for adding packages to the project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageInstallOptions {
    pub dev: bool,
    pub skip_lock: bool,
    pub system: bool,
    pub want_hashes: bool,
}

/// Install each requirement and declare it in the manifest, then lock
///
/// Requirements are parsed up front, so a malformed one installs nothing. Each package
/// is installed with its dependencies and without hash checks, then added to the
/// manifest right away. A failing package stops the run; packages before it stay
/// declared.
pub fn install_packages(
    ctx: &ProjectContext<'_>,
    manifest: &mut Manifest,
    requirements: &[String],
    editables: &[String],
    options: PackageInstallOptions,
) -> Result<()> {
    let constraints = parse_requirements(requirements, editables)?;
    let group = DependencyGroup::from_dev_flag(options.dev);
    let store = ctx.manifest_store();
    let installer = ctx.installer(options.system);
    let sources = manifest.sources();
    let install_options = InstallOptions {
        hash_mode: HashMode::Ignore,
        expand_dependencies: true,
    };

    for constraint in &constraints {
        eprintln!(
            "Installing {}...",
            Style::new().green().apply_to(constraint.to_string())
        );
        let plan = InstallPlan::from_constraints(std::slice::from_ref(constraint));
        install_all(
            &plan,
            &installer,
            &sources,
            install_options,
            &ctx.progress(plan.len()),
        )?
        .into_result()?;

        eprintln!(
            "Adding {} to Pipfile's {}...",
            Style::new().bold().apply_to(&constraint.name),
            Style::new().red().apply_to(format!("[{}]", group.section()))
        );
        manifest.add(group, constraint);
        store.save(manifest)?;
    }

    if !options.skip_lock {
        do_lock(ctx, manifest, options.want_hashes)?;
    }
    Ok(())
}

/// Requirements as given, then editables (`-e` is implied for those)
fn parse_requirements(
    requirements: &[String],
    editables: &[String],
) -> Result<Vec<DependencyConstraint>> {
    requirements
        .iter()
        .map(|r| DependencyConstraint::from_requirement(r))
        .chain(
            editables
                .iter()
                .map(|e| DependencyConstraint::from_requirement(&format!("-e {}", e))),
        )
        .collect()
}
