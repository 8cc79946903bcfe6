//! Install command
//!
//! Without package arguments this installs everything the project declares, from
//! Pipfile.lock unless `--skip-lock` is given. With package arguments each one is
//! installed, added to the Pipfile, and the lock is regenerated.

use crate::cli::InstallArgs;
use crate::error::Result;
use crate::operations::ProjectContext;
use crate::operations::ensure::ensure_project;
use crate::operations::install::{
    HashMode, InitOptions, PackageInstallOptions, do_init, install_packages,
};

pub fn run(ctx: &ProjectContext<'_>, args: InstallArgs) -> Result<()> {
    let python = args.python_request();
    let mut manifest = ensure_project(ctx, python.as_deref(), true, args.system)?;
    let want_hashes = !args.no_hashes;

    if !args.has_packages() {
        let hash_mode = if args.require_hashes {
            HashMode::Require
        } else {
            HashMode::Prefer
        };
        return do_init(
            ctx,
            &manifest,
            InitOptions {
                dev: args.dev,
                skip_lock: args.skip_lock,
                ignore_manifest: args.ignore_pipfile,
                system: args.system,
                hash_mode,
                want_hashes,
            },
        );
    }

    install_packages(
        ctx,
        &mut manifest,
        &args.packages,
        &args.editable,
        PackageInstallOptions {
            dev: args.dev,
            skip_lock: args.skip_lock,
            system: args.system,
            want_hashes,
        },
    )
}
