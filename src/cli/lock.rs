use clap::Parser;

/// Arguments for the lock command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Regenerate Pipfile.lock:\n    pinenv lock\n\n\
                  Lock without hashes:\n    pinenv lock --no-hashes\n\n\
                  Print the lock as requirements.txt:\n    pinenv lock -r > requirements.txt")]
pub struct LockArgs {
    /// Print the locked packages as requirements.txt lines instead of installing
    #[arg(long, short = 'r')]
    pub requirements: bool,

    /// Do not record hashes
    #[arg(long)]
    pub no_hashes: bool,
}
