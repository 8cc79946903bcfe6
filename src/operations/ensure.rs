//! Bootstrapping the manifest, the environment, and the installer

use console::Style;
use tracing::{debug, info};

use super::ProjectContext;
use crate::common::fs::read_to_string;
use crate::error::Result;
use crate::installer::heuristics::installer_is_outdated;
use crate::installer::{InstallFlags, InstallTarget};
use crate::manifest::names::is_bootstrap_package;
use crate::manifest::{DependencyConstraint, DependencyGroup, Manifest, ManifestStore};
use crate::project::{ProperCasingRegistry, reconcile_casing};

/// Load the manifest, creating or importing it first when there is none
///
/// Unless validation is skipped, declared names are reconciled to their proper
/// casing after a requirements import, or with `validate` once the environment
/// exists. The manifest is saved again if any name changed.
pub fn ensure_manifest(ctx: &ProjectContext<'_>, validate: bool) -> Result<Manifest> {
    let store = ctx.manifest_store();
    let mut imported = false;

    let mut manifest = if store.exists() {
        store.load()?
    } else if ctx.project.requirements_path.is_file() {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Requirements file found, instead of Pipfile! Converting...")
        );
        let manifest = import_requirements(&read_to_string(&ctx.project.requirements_path)?)?;
        store.save(&manifest)?;
        imported = true;
        manifest
    } else {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Creating a Pipfile for this project...")
        );
        let manifest = Manifest::new_default();
        store.save(&manifest)?;
        manifest
    };

    if !ctx.settings.skip_validation && (imported || (validate && ctx.project.env.exists())) {
        fix_casing(ctx, &mut manifest, &store)?;
    }

    Ok(manifest)
}

fn fix_casing(
    ctx: &ProjectContext<'_>,
    manifest: &mut Manifest,
    store: &dyn ManifestStore,
) -> Result<()> {
    let mut registry = ProperCasingRegistry::load(ctx.project.casing_registry_path())?;

    let mut changed = false;
    for group in DependencyGroup::ALL {
        let outcome = reconcile_casing(manifest, group, &mut registry, ctx.lookup);
        debug!(
            group = %group,
            renamed = outcome.renamed.len(),
            skipped = outcome.skipped,
            known = outcome.known,
            "casing reconciled"
        );
        changed |= outcome.changed;
    }

    // the registry lives inside the environment
    if ctx.project.env.exists() {
        registry.save()?;
    }

    if changed {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Fixing package names in Pipfile...")
        );
        store.save(manifest)?;
    }
    Ok(())
}

/// A manifest declaring every requirement of a `requirements.txt`
///
/// Comments, blank lines, and option lines are skipped, as are bootstrap packages.
pub fn import_requirements(text: &str) -> Result<Manifest> {
    let mut manifest = Manifest::new_default();

    for line in text.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() || (line.starts_with('-') && !line.starts_with("-e ")) {
            continue;
        }

        let constraint = DependencyConstraint::from_requirement(line)?;
        if is_bootstrap_package(&constraint.name) {
            debug!(package = %constraint.name, "skipping bootstrap package");
            continue;
        }
        manifest.add(DependencyGroup::Default, &constraint);
    }

    Ok(manifest)
}

/// Everything before a `#` that starts the line or follows whitespace
///
/// A `#` inside a URL (`#egg=`) is not a comment.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Create the project environment if missing
///
/// When an interpreter is requested explicitly for an existing environment, the
/// environment is removed and created again with it.
pub fn ensure_environment(ctx: &ProjectContext<'_>, python: Option<&str>) -> Result<()> {
    let env = &ctx.project.env;
    let manager = ctx.env_manager();

    if env.exists() {
        if python.is_none() {
            return Ok(());
        }
        eprintln!("{}", Style::new().red().apply_to("Virtualenv already exists!"));
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Removing existing virtualenv...")
        );
        manager.remove(env)?;
    }

    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to("Creating a virtualenv for this project...")
    );
    if let Some(python) = python {
        eprintln!(
            "{} {} {}",
            Style::new().yellow().apply_to("Using"),
            Style::new().red().apply_to(python),
            Style::new().yellow().apply_to("to create virtualenv...")
        );
    }

    let output = manager.create(env, &ctx.project.name, python)?;
    eprintln!("{}", Style::new().blue().apply_to(output.stdout.trim_end()));
    eprintln!(
        "Virtualenv location: {}",
        Style::new().green().apply_to(env.location().display())
    );
    Ok(())
}

/// Ensure the manifest exists, then the environment unless running in system mode
pub fn ensure_project(
    ctx: &ProjectContext<'_>,
    python: Option<&str>,
    validate: bool,
    system: bool,
) -> Result<Manifest> {
    let manifest = ensure_manifest(ctx, validate)?;
    if !system {
        ensure_environment(ctx, python)?;
    }
    Ok(manifest)
}

/// Upgrade the environment's installer when it reports itself out of date
pub fn ensure_latest_installer(ctx: &ProjectContext<'_>) -> Result<()> {
    let installer = ctx.installer(false);
    let target = InstallTarget::Requirement(ctx.settings.installer.clone());

    let attempt = installer.install(&target, None, InstallFlags::default())?;
    if !installer_is_outdated(&attempt.stderr) {
        return Ok(());
    }

    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to("Pip is out of date... updating to latest.")
    );
    info!(installer = %installer.program().display(), "upgrading installer");
    let flags = InstallFlags {
        upgrade: true,
        ..InstallFlags::default()
    };
    let output = installer.install(&target, None, flags)?;
    eprintln!("{}", Style::new().blue().apply_to(output.stdout.trim_end()));
    Ok(())
}
