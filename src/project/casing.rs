//! Proper casing of declared package names
//!
//! Users write `django`; the index knows the project as `Django`. Reconciliation
//! renames manifest keys to the index's casing. Names already seen are remembered in
//! a [`ProperCasingRegistry`] so each name costs at most one lookup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::fs::{read_to_string, write_atomic};
use crate::error::Result;
use crate::manifest::{DependencyGroup, Manifest};
use crate::registry::CanonicalNameLookup;

/// File name of the registry inside the environment directory
pub const CASING_FILE: &str = ".pinenv-casing";

/// Known canonical casings, keyed by lowercased name
///
/// Persisted as one canonical name per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProperCasingRegistry {
    path: PathBuf,
    names: BTreeMap<String, String>,
}

impl ProperCasingRegistry {
    /// Load the registry at `path`; a missing file is an empty registry
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let names = if path.is_file() {
            read_to_string(&path)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|name| (name.to_lowercase(), name.to_string()))
                .collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, names })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let mut text = String::new();
        for name in self.names.values() {
            text.push_str(name);
            text.push('\n');
        }
        write_atomic(&self.path, text.as_bytes())
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn register(&mut self, canonical: &str) {
        self.names
            .insert(canonical.to_lowercase(), canonical.to_string());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What reconciliation did to one manifest section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CasingOutcome {
    /// Whether any manifest key was renamed
    pub changed: bool,
    /// `(declared, canonical)` pairs
    pub renamed: Vec<(String, String)>,
    /// Names whose lookup failed
    pub skipped: usize,
    /// Names the registry already knew
    pub known: usize,
}

/// Rename the keys of `group` to their canonical casing
///
/// Lookup failures are counted, never raised. The manifest and registry are only
/// changed in memory.
pub fn reconcile_casing(
    manifest: &mut Manifest,
    group: DependencyGroup,
    registry: &mut ProperCasingRegistry,
    lookup: &dyn CanonicalNameLookup,
) -> CasingOutcome {
    let mut outcome = CasingOutcome::default();

    for declared in manifest.package_names(group) {
        let canonical = match registry.get(&declared) {
            Some(known) => {
                outcome.known += 1;
                known.to_string()
            }
            None => match lookup.canonical_name(&declared) {
                Ok(canonical) => {
                    registry.register(&canonical);
                    canonical
                }
                Err(e) => {
                    warn!(package = %declared, "could not look up proper casing: {}", e);
                    outcome.skipped += 1;
                    continue;
                }
            },
        };

        if canonical != declared && manifest.rename(group, &declared, &canonical) {
            debug!(from = %declared, to = %canonical, "renamed to proper casing");
            outcome.renamed.push((declared, canonical));
            outcome.changed = true;
        }
    }

    outcome
}
