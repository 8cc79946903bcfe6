//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install command arguments
//! - uninstall: Uninstall command arguments
//! - lock: Lock command arguments
//! - update: Update command arguments
//! - completions: Completions command arguments
//!
//! Runtime settings ([`Settings`]) are flattened in as hidden global flags, each also
//! read from its `PINENV_*` environment variable.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod install;
pub mod lock;
pub mod uninstall;
pub mod update;

pub use completions::CompletionsArgs;
pub use install::InstallArgs;
pub use lock::LockArgs;
pub use uninstall::UninstallArgs;
pub use update::UpdateArgs;

use crate::settings::Settings;

/// pinenv - Pipfile project manager
///
/// Keeps a Pipfile, its Pipfile.lock, and a project virtualenv in agreement.
#[derive(Parser, Debug)]
#[command(
    name = "pinenv",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Pipfile and Pipfile.lock driven virtualenv management",
    long_about = "pinenv installs the packages a Pipfile declares into a per-project virtualenv, \
                  records exact pins and hashes in Pipfile.lock, and keeps the three in sync.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  pinenv install                     \x1b[90m# Install everything from Pipfile.lock\x1b[0m\n   \
                  pinenv install requests            \x1b[90m# Install and declare a package\x1b[0m\n   \
                  pinenv install pytest --dev        \x1b[90m# Declare a development package\x1b[0m\n   \
                  pinenv uninstall requests          \x1b[90m# Remove a package\x1b[0m\n   \
                  pinenv lock                        \x1b[90m# Regenerate Pipfile.lock\x1b[0m\n   \
                  pinenv lock -r > requirements.txt  \x1b[90m# Export pinned requirements\x1b[0m\n   \
                  pinenv update --dry-run            \x1b[90m# List available updates\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "PINENV_PROJECT")]
    pub project: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages, or everything the project declares
    Install(InstallArgs),

    /// Uninstall packages and remove them from the Pipfile
    Uninstall(UninstallArgs),

    /// Generate Pipfile.lock
    Lock(LockArgs),

    /// Check for or apply dependency updates
    Update(UpdateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
