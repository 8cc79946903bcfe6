//! Locking: resolve both groups and write Pipfile.lock

use console::Style;
use tracing::info;

use super::ProjectContext;
use crate::environment::markers::read_host_markers;
use crate::error::Result;
use crate::lock::{LockArtifact, is_stale, synthesize};
use crate::manifest::{DependencyGroup, Manifest};
use crate::resolver::resolve;

/// Resolve `develop` then `default`, then synthesize and save the lock
///
/// Unknown keys of the previous lock are carried over.
pub fn do_lock(
    ctx: &ProjectContext<'_>,
    manifest: &Manifest,
    want_hashes: bool,
) -> Result<LockArtifact> {
    let sources = manifest.sources();
    let store = ctx.lock_store();
    let previous = store.load()?;
    let installer = ctx.installer(false);

    let mut resolutions = Vec::with_capacity(2);
    for group in [DependencyGroup::Develop, DependencyGroup::Default] {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to(format!("Locking [{}] dependencies...", group.section()))
        );
        let constraints = manifest.constraints(group)?;
        info!(group = %group, count = constraints.len(), "resolving");
        resolutions.push(resolve(&installer, &constraints, &sources, want_hashes)?);
    }
    let default = resolutions.pop().unwrap_or_default();
    let develop = resolutions.pop().unwrap_or_default();

    let markers = read_host_markers(ctx.runner, &ctx.project.env.python())?;
    let lock = synthesize(previous.as_ref(), manifest, default, develop, markers)?;
    store.save(&lock)?;

    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to(format!("Updated {}!", crate::lock::LOCK_FILE))
    );
    Ok(lock)
}

/// The current lock, written first when it is missing or out of date
///
/// With `ignore_manifest` an existing lock is used as is, stale or not.
pub fn ensure_lock(
    ctx: &ProjectContext<'_>,
    manifest: &Manifest,
    want_hashes: bool,
    ignore_manifest: bool,
) -> Result<LockArtifact> {
    let Some(lock) = ctx.lock_store().load()? else {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Pipfile.lock not found, creating...")
        );
        return do_lock(ctx, manifest, want_hashes);
    };

    if ignore_manifest || !is_stale(manifest, Some(&lock))? {
        return Ok(lock);
    }

    eprintln!(
        "{}",
        Style::new()
            .red()
            .apply_to("Pipfile.lock out of date, updating...")
    );
    do_lock(ctx, manifest, want_hashes)
}
