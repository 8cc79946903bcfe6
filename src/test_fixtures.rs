//! Test fixtures shared by unit tests
//!
//! - [`ScriptedRunner`]: a [`ProcessRunner`] that records every command and answers
//!   from a closure instead of spawning processes
//! - [`StaticLookup`]: a [`CanonicalNameLookup`] backed by a fixed table
//! - Temp directory helpers
//!
//! # Usage
//!
//! ```ignore
//! let runner = ScriptedRunner::new(|spec| match spec.get_args().first() {
//!     Some(arg) if arg == "freeze" => ProcessOutput::new(0, "alpha==1.0\n", ""),
//!     _ => ProcessOutput::default(),
//! });
//! let installer = Installer::new(&runner, "pip");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{Result, registry};
use crate::registry::CanonicalNameLookup;
use crate::runner::{CommandSpec, ProcessOutput, ProcessRunner};

type Script = Box<dyn Fn(&CommandSpec) -> Result<ProcessOutput>>;

/// Records commands and answers them from a script
pub struct ScriptedRunner {
    script: Script,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&CommandSpec) -> ProcessOutput + 'static,
    {
        Self::fallible(move |spec| Ok(script(spec)))
    }

    /// Script that may also fail to run (timeouts, interrupts)
    pub fn fallible<F>(script: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<ProcessOutput> + 'static,
    {
        Self {
            script: Box::new(script),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Calls whose first argument is `subcommand`
    pub fn calls_to(&self, subcommand: &str) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| spec.get_args().first().is_some_and(|a| a == subcommand))
            .cloned()
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        self.calls.borrow_mut().push(spec.clone());
        (self.script)(spec)
    }
}

/// Name lookup answering from a fixed table; unknown names fail
#[derive(Debug, Default)]
pub struct StaticLookup {
    names: HashMap<String, String>,
    queried: RefCell<Vec<String>>,
}

impl StaticLookup {
    pub fn new(names: &[(&str, &str)]) -> Self {
        Self {
            names: names
                .iter()
                .map(|(from, to)| (from.to_lowercase(), (*to).to_string()))
                .collect(),
            queried: RefCell::new(Vec::new()),
        }
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.borrow().clone()
    }
}

impl CanonicalNameLookup for StaticLookup {
    fn canonical_name(&self, name: &str) -> Result<String> {
        self.queried.borrow_mut().push(name.to_string());
        self.names
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| registry::lookup_failed(name, "404 Not Found"))
    }
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Create a temp project directory containing the given files.
///
/// # Panics
///
/// Panics if any file cannot be created.
#[must_use]
pub fn create_project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    for (path, content) in files {
        let full_path = temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
    let root = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp dir");
    (temp, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_runner_records_calls() {
        let runner = ScriptedRunner::new(|spec| {
            ProcessOutput::new(0, spec.program_name(), "")
        });

        let output = runner.run(&CommandSpec::new("pip").arg("freeze")).unwrap();

        assert_eq!(output.stdout, "pip");
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.calls_to("freeze").len(), 1);
        assert!(runner.calls_to("install").is_empty());
    }

    #[test]
    fn test_static_lookup() {
        let lookup = StaticLookup::new(&[("django", "Django")]);
        assert_eq!(lookup.canonical_name("DJANGO").unwrap(), "Django");
        assert!(lookup.canonical_name("missing").is_err());
        assert_eq!(lookup.queried(), vec!["DJANGO", "missing"]);
    }

    #[test]
    fn test_create_project() {
        let (_temp, root) = create_project(&[("Pipfile", "[packages]\n"), ("sub/a.txt", "a")]);
        assert!(root.join("Pipfile").exists());
        assert!(root.join("sub/a.txt").exists());
    }
}
