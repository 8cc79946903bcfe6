//! pinenv - Pipfile project manager
//!
//! Keeps a Pipfile, its Pipfile.lock, and a per-project virtualenv in agreement by
//! driving an external package installer and environment manager.

use clap::Parser;
use console::Style;
use miette::Diagnostic;
use std::path::Path;

mod cli;
mod commands;
mod common;
mod environment;
mod error;
mod installer;
mod interrupt;
mod lock;
mod logging;
mod manifest;
mod operations;
mod progress;
mod project;
mod registry;
mod resolver;
mod runner;
mod settings;
mod temp;
mod transaction;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use error::{PinenvError, Result};
use installer::parser::{format_installer_error, format_installer_output};
use operations::ProjectContext;
use project::Project;
use registry::PypiLookup;
use runner::SystemRunner;
use settings::Settings;

/// Discover the project and run `f` against it
fn in_project<T, F>(start: Option<&Path>, settings: &Settings, f: F) -> Result<T>
where
    F: FnOnce(&ProjectContext<'_>) -> Result<T>,
{
    let start = match start {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let project = Project::discover(&start, settings)?;
    tracing::debug!(root = %project.root.display(), "project discovered");

    let runner = SystemRunner::default();
    let lookup = PypiLookup::default();
    let ctx = ProjectContext::new(&project, settings, &runner, &lookup);
    f(&ctx)
}

fn report(error: &PinenvError) {
    eprintln!("{} {}", Style::new().red().bold().apply_to("Error:"), error);
    if let Some(help) = error.help() {
        eprintln!("  {} {}", Style::new().cyan().apply_to("help:"), help);
    }
    if let Some((stdout, stderr)) = error.captured_output() {
        let stdout = format_installer_output(stdout);
        if !stdout.trim().is_empty() {
            eprintln!("{}", stdout.trim_end());
        }
        let stderr = format_installer_error(stderr);
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.settings.colorblind {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    logging::init(cli.verbose, cli.quiet, !cli.settings.colorblind);
    if let Err(e) = interrupt::install_handler() {
        tracing::warn!("cannot install Ctrl-C handler: {}", e);
    }

    let project = cli.project.as_deref();
    let settings = &cli.settings;
    let result = match cli.command {
        Commands::Install(args) => {
            in_project(project, settings, |ctx| commands::install::run(ctx, args)).map(|()| 0)
        }
        Commands::Uninstall(args) => {
            in_project(project, settings, |ctx| commands::uninstall::run(ctx, args)).map(|()| 0)
        }
        Commands::Lock(args) => {
            in_project(project, settings, |ctx| commands::lock::run(ctx, args)).map(|()| 0)
        }
        Commands::Update(args) => {
            in_project(project, settings, |ctx| commands::update::run(ctx, args))
        }
        Commands::Completions(args) => commands::completions::run(args).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            report(&e);
            std::process::exit(e.exit_code());
        }
    }
}
