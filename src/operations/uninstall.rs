//! Uninstall operation
//!
//! Removes packages from the environment and the manifest, uninstalls every dev
//! package, or purges the environment down to its bootstrap packages.

use console::Style;
use tracing::warn;

use super::ProjectContext;
use super::lock::do_lock;
use crate::error::{PinenvError, Result};
use crate::installer::Installer;
use crate::manifest::names::is_bootstrap_package;
use crate::manifest::{DependencyGroup, Manifest, ManifestStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    pub system: bool,
    /// Leave Pipfile.lock as it is
    pub no_lock: bool,
    pub want_hashes: bool,
}

/// Uninstall `names` and drop them from both manifest groups, then re-lock
pub fn uninstall_packages(
    ctx: &ProjectContext<'_>,
    manifest: &mut Manifest,
    names: &[String],
    options: UninstallOptions,
) -> Result<()> {
    if names.is_empty() {
        return Err(PinenvError::NoPackageProvided);
    }

    let installer = ctx.installer(options.system);
    let mut changed = false;

    for name in names {
        uninstall_one(&installer, name)?;

        let declared = DependencyGroup::ALL
            .iter()
            .any(|group| manifest.contains(*group, name));
        if !declared {
            eprintln!(
                "No package {} to remove from Pipfile.",
                Style::new().green().apply_to(name)
            );
            continue;
        }

        eprintln!("Removing {} from Pipfile...", Style::new().green().apply_to(name));
        for group in DependencyGroup::ALL {
            changed |= manifest.remove(group, name);
        }
    }

    if changed {
        ctx.manifest_store().save(manifest)?;
    }
    if !options.no_lock {
        do_lock(ctx, manifest, options.want_hashes)?;
    }
    Ok(())
}

/// Uninstall every declared dev package; the manifest is left untouched
pub fn uninstall_dev(ctx: &ProjectContext<'_>, manifest: &Manifest, system: bool) -> Result<()> {
    let names = manifest.package_names(DependencyGroup::Develop);
    let section = Style::new().red().apply_to("[dev-packages]");
    if names.is_empty() {
        eprintln!(
            "{} {} {}",
            Style::new().yellow().apply_to("No"),
            section,
            Style::new().yellow().apply_to("to uninstall.")
        );
        return Ok(());
    }

    eprintln!("{} {}...", Style::new().yellow().apply_to("Un-installing"), section);
    let installer = ctx.installer(system);
    for name in &names {
        uninstall_one(&installer, name)?;
    }
    Ok(())
}

fn uninstall_one(installer: &Installer<'_>, name: &str) -> Result<()> {
    eprintln!("Un-installing {}...", Style::new().green().apply_to(name));
    let output = installer.uninstall(&[name])?;
    if !output.success() {
        warn!(package = %name, exit_code = output.exit_code, "uninstall reported failure");
    }
    print_output(&output.stdout);
    Ok(())
}

/// Uninstall everything `freeze` reports except bootstrap packages
///
/// Returns the names that were uninstalled.
pub fn purge(installer: &Installer<'_>) -> Result<Vec<String>> {
    let names: Vec<String> = installer
        .freeze()?
        .into_iter()
        .map(|package| package.name)
        .filter(|name| !is_bootstrap_package(name))
        .collect();

    eprintln!("Found {} installed package(s), purging...", names.len());
    if !names.is_empty() {
        let output = installer.uninstall(&names)?;
        print_output(&output.stdout);
    }
    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to("Environment now purged and fresh!")
    );
    Ok(names)
}

fn print_output(stdout: &str) {
    let stdout = stdout.trim_end();
    if !stdout.is_empty() {
        eprintln!("{}", Style::new().blue().apply_to(stdout));
    }
}
