//! Runtime settings
//!
//! Every setting is read from a `PINENV_*` environment variable and can also be given
//! as a hidden long flag. They are flattened into the top-level CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::builder::BoolishValueParser;

/// Default environment creation timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Seconds to wait for environment creation
    #[arg(
        long = "timeout",
        env = "PINENV_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        global = true,
        hide = true
    )]
    pub timeout_secs: u64,

    /// Create the environment in `<project>/.venv`
    #[arg(
        long,
        env = "PINENV_VENV_IN_PROJECT",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true,
        hide = true
    )]
    pub venv_in_project: bool,

    /// Installer executable name
    #[arg(
        long,
        env = "PINENV_INSTALLER",
        default_value = "pip",
        global = true,
        hide = true
    )]
    pub installer: String,

    /// Environment manager executable
    #[arg(
        long,
        env = "PINENV_ENV_MANAGER",
        default_value = "virtualenv",
        global = true,
        hide = true
    )]
    pub env_manager: String,

    /// Do not check package names against the package index
    #[arg(
        long,
        env = "PINENV_SKIP_VALIDATION",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true,
        hide = true
    )]
    pub skip_validation: bool,

    /// Do not draw progress bars
    #[arg(
        long,
        env = "PINENV_NO_PROGRESS",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true,
        hide = true
    )]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(
        long,
        env = "PINENV_COLORBLIND",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true,
        hide = true
    )]
    pub colorblind: bool,

    /// Directory holding environments that live outside the project
    #[arg(long, env = "PINENV_VENV_HOME", global = true, hide = true)]
    pub venv_home: Option<PathBuf>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            venv_in_project: false,
            installer: "pip".to_string(),
            env_manager: "virtualenv".to_string(),
            skip_validation: false,
            no_progress: false,
            colorblind: false,
            venv_home: None,
        }
    }
}
