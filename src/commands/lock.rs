//! Lock command
//!
//! `-r` prints the locked set as requirements lines on stdout instead of
//! regenerating the lock; an up-to-date lock is reused.

use crate::cli::LockArgs;
use crate::error::Result;
use crate::operations::ProjectContext;
use crate::operations::ensure::ensure_project;
use crate::operations::install::InstallPlan;
use crate::operations::lock::{do_lock, ensure_lock};

pub fn run(ctx: &ProjectContext<'_>, args: LockArgs) -> Result<()> {
    let manifest = ensure_project(ctx, None, true, false)?;
    let want_hashes = !args.no_hashes;

    if args.requirements {
        let lock = ensure_lock(ctx, &manifest, want_hashes, false)?;
        for line in InstallPlan::from_lock(&lock, true).requirement_lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    do_lock(ctx, &manifest, want_hashes)?;
    Ok(())
}
