use clap::Parser;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a package and drop it from the Pipfile:\n    pinenv uninstall requests\n\n\
                  Uninstall without regenerating Pipfile.lock:\n    pinenv uninstall requests --no-lock\n\n\
                  Uninstall every development package:\n    pinenv uninstall --dev\n\n\
                  Purge the virtualenv:\n    pinenv uninstall --all")]
pub struct UninstallArgs {
    /// Packages to uninstall
    pub packages: Vec<String>,

    /// Uninstall every installed package; the Pipfile is left alone
    #[arg(long, conflicts_with_all = ["packages", "dev"])]
    pub all: bool,

    /// Uninstall every package in [dev-packages]; the Pipfile is left alone
    #[arg(long, short = 'd', conflicts_with = "packages")]
    pub dev: bool,

    /// Do not regenerate Pipfile.lock afterwards
    #[arg(long)]
    pub no_lock: bool,

    /// Do not record hashes when Pipfile.lock is regenerated
    #[arg(long)]
    pub no_hashes: bool,

    /// Uninstall from the interpreter on PATH instead of the project virtualenv
    #[arg(long)]
    pub system: bool,
}
