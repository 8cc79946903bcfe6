//! Uninstall command

use console::Style;

use crate::cli::UninstallArgs;
use crate::error::Result;
use crate::operations::ProjectContext;
use crate::operations::ensure::ensure_project;
use crate::operations::uninstall::{UninstallOptions, purge, uninstall_dev, uninstall_packages};

pub fn run(ctx: &ProjectContext<'_>, args: UninstallArgs) -> Result<()> {
    let mut manifest = ensure_project(ctx, None, true, args.system)?;

    if args.all {
        eprintln!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Un-installing all packages from virtualenv...")
        );
        purge(&ctx.installer(args.system))?;
        return Ok(());
    }

    if args.dev {
        return uninstall_dev(ctx, &manifest, args.system);
    }

    uninstall_packages(
        ctx,
        &mut manifest,
        &args.packages,
        UninstallOptions {
            system: args.system,
            no_lock: args.no_lock,
            want_hashes: !args.no_hashes,
        },
    )
}
