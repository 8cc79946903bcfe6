//! Update command

use console::Style;

use crate::cli::UpdateArgs;
use crate::error::Result;
use crate::operations::ProjectContext;
use crate::operations::ensure::ensure_project;
use crate::operations::update::{check_updates, report_updates, update};

/// Exit status of `update --dry-run` when updates are available
pub const UPDATES_AVAILABLE: i32 = 1;

/// Apply updates, or with `--dry-run` list them
///
/// Returns the exit status: [`UPDATES_AVAILABLE`] when a dry run found updates,
/// 0 otherwise.
pub fn run(ctx: &ProjectContext<'_>, args: UpdateArgs) -> Result<i32> {
    let manifest = ensure_project(ctx, None, false, false)?;

    if args.dry_run {
        eprintln!(
            "{}",
            Style::new().yellow().apply_to("Checking dependencies...")
        );
        let updates = check_updates(ctx, &manifest, args.dev)?;
        return Ok(if report_updates(&updates) {
            UPDATES_AVAILABLE
        } else {
            0
        });
    }

    update(ctx, &manifest, args.dev)?;
    Ok(0)
}
