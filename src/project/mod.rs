//! Project discovery
//!
//! A project is the directory holding the Pipfile. Its lock, an optional
//! `requirements.txt` to import, and the location of its environment are all derived
//! from that directory.

pub mod casing;

use std::path::{Path, PathBuf};

use crate::environment::Environment;
use crate::error::{Result, fs};
use crate::lock::LOCK_FILE;
use crate::manifest::MANIFEST_FILE;
use crate::settings::Settings;

pub use casing::{ProperCasingRegistry, reconcile_casing};

/// Requirements file imported when no manifest exists yet
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Environment directory name when it lives inside the project
pub const IN_PROJECT_ENV_DIR: &str = ".venv";

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub name: String,
    pub manifest_path: PathBuf,
    pub lock_path: PathBuf,
    pub requirements_path: PathBuf,
    pub env: Environment,
}

impl Project {
    /// Walk up from `start` to the nearest directory with a Pipfile
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(MANIFEST_FILE).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// The project containing `start`, or a new one rooted at `start`
    pub fn discover(start: &Path, settings: &Settings) -> Result<Self> {
        let start = dunce::canonicalize(start)
            .map_err(|e| fs::read_failed(start.display().to_string(), e.to_string()))?;
        let root = Self::find_root(&start).unwrap_or(start);
        Ok(Self::at(root, settings))
    }

    /// A project rooted exactly at `root`
    pub fn at(root: PathBuf, settings: &Settings) -> Self {
        let name = root
            .file_name()
            .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned());
        let env = Environment::new(env_location(&root, &name, settings));

        Self {
            manifest_path: root.join(MANIFEST_FILE),
            lock_path: root.join(LOCK_FILE),
            requirements_path: root.join(REQUIREMENTS_FILE),
            name,
            env,
            root,
        }
    }

    /// Where the casing registry is kept
    pub fn casing_registry_path(&self) -> PathBuf {
        self.env.location().join(casing::CASING_FILE)
    }
}

/// `<root>/.venv` in-project, otherwise `<venv home>/<name>-<hash8>`
///
/// The hash of the project path keeps same-named projects apart.
fn env_location(root: &Path, name: &str, settings: &Settings) -> PathBuf {
    let home = if settings.venv_in_project {
        None
    } else {
        settings
            .venv_home
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("pinenv").join("envs")))
    };

    let Some(home) = home else {
        return root.join(IN_PROJECT_ENV_DIR);
    };

    let digest = blake3::hash(root.to_string_lossy().as_bytes()).to_hex();
    home.join(format!("{}-{}", name, &digest.as_str()[..8]))
}
