//! Project-level operations
//!
//! This module provides the workflows behind each command:
//! - ensure: Manifest, environment and installer bootstrapping
//! - lock: Resolving both groups and writing Pipfile.lock
//! - install: Install plans, the sequential orchestrator, and `install` itself
//! - uninstall: Removing packages, dev packages, or everything
//! - update: Checking for and applying updates
//!
//! Every operation takes a [`ProjectContext`]; nothing reads global state.

pub mod ensure;
pub mod install;
pub mod lock;
pub mod uninstall;
pub mod update;

use crate::environment::EnvironmentManager;
use crate::installer::Installer;
use crate::lock::LockStore;
use crate::manifest::FileManifestStore;
use crate::progress::ProgressDisplay;
use crate::project::Project;
use crate::registry::CanonicalNameLookup;
use crate::runner::ProcessRunner;
use crate::settings::Settings;

/// Everything an operation needs to know about the project and the host
pub struct ProjectContext<'a> {
    pub project: &'a Project,
    pub settings: &'a Settings,
    pub runner: &'a dyn ProcessRunner,
    pub lookup: &'a dyn CanonicalNameLookup,
}

impl<'a> ProjectContext<'a> {
    pub fn new(
        project: &'a Project,
        settings: &'a Settings,
        runner: &'a dyn ProcessRunner,
        lookup: &'a dyn CanonicalNameLookup,
    ) -> Self {
        Self {
            project,
            settings,
            runner,
            lookup,
        }
    }

    /// The installer of the project environment, or the one on PATH in system mode
    pub fn installer(&self, system: bool) -> Installer<'a> {
        if system {
            return Installer::new(self.runner, &self.settings.installer);
        }

        let env = &self.project.env;
        Installer::new(self.runner, env.which(&self.settings.installer))
            .with_env("VIRTUAL_ENV", env.location().display().to_string())
            .with_env("PINENV_ACTIVE", "1")
    }

    pub fn env_manager(&self) -> EnvironmentManager<'a> {
        EnvironmentManager::new(
            self.runner,
            &self.settings.env_manager,
            self.settings.timeout(),
        )
    }

    pub fn manifest_store(&self) -> FileManifestStore {
        FileManifestStore::new(&self.project.manifest_path)
    }

    pub fn lock_store(&self) -> LockStore {
        LockStore::new(&self.project.lock_path)
    }

    /// Progress bar for `total` packages, hidden when progress is disabled
    pub fn progress(&self, total: usize) -> ProgressDisplay {
        if self.settings.no_progress {
            ProgressDisplay::hidden()
        } else {
            ProgressDisplay::new(total as u64)
        }
    }
}
