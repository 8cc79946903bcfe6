use clap::Parser;

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List available updates (exits 1 when there are any):\n    pinenv update --dry-run\n\n\
                  Reinstall everything at the latest allowed versions:\n    pinenv update --dev")]
pub struct UpdateArgs {
    /// Only list the packages that have newer versions
    #[arg(long)]
    pub dry_run: bool,

    /// Include [dev-packages]
    #[arg(long, short = 'd')]
    pub dev: bool,
}
