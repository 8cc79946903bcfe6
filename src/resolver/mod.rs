//! Resolution of declared constraints into exact pins
//!
//! This module handles:
//! - Downloading each registry constraint through the installer, one at a time, with
//!   source fallback
//! - Mapping the downloaded files back to package names and versions
//! - Checking resolved versions against the declared specifier
//! - Hashing the downloaded files
//!
//! VCS constraints are not downloaded; they are passed through as declared.
//! Resolution has no side effects on the manifest or the lock.

pub mod version;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PinenvError, Result, install};
use crate::installer::parser::{
    distribution_name, name_from_filename, parse_install_output, parse_version,
};
use crate::installer::{Installer, Source, for_each_source};
use crate::lock::{LockedPackage, LockedVcsPackage};
use crate::manifest::{DependencyConstraint, canonical_name};
use crate::runner::ProcessOutput;
use crate::temp::scratch_dir;

pub use version::{Version, VersionSpecifiers};

/// Prefix of the scratch directories downloads land in
const DOWNLOAD_DIR_PREFIX: &str = "pinenv-download-";

/// Pinned packages of one dependency group, keyed by proper-cased name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub packages: BTreeMap<String, LockedPackage>,
    pub vcs: BTreeMap<String, LockedVcsPackage>,
}

/// Resolve the constraints of one dependency group
///
/// Packages pulled in transitively are pinned as well. A constraint that no source can
/// satisfy is fatal. Packages are keyed by their declared name, or by the name in the
/// distribution file for undeclared ones; a package is never pinned twice under
/// differently cased names.
pub fn resolve(
    installer: &Installer<'_>,
    constraints: &[DependencyConstraint],
    sources: &[Source],
    want_hashes: bool,
) -> Result<Resolution> {
    let declared: HashMap<String, &DependencyConstraint> = constraints
        .iter()
        .filter(|c| !c.is_vcs())
        .map(|c| (c.key(), c))
        .collect();

    let mut resolution = Resolution::default();
    let mut pinned_as: HashMap<String, String> = HashMap::new();

    for constraint in constraints {
        if let Some(locked) = LockedVcsPackage::from_constraint(constraint) {
            resolution.vcs.insert(constraint.name.clone(), locked);
            continue;
        }

        let requirement = constraint.requirement_string();
        let (dir, output) = download(installer, &requirement, sources)?;
        if !output.success() {
            return Err(install::resolution_failed(
                requirement,
                output.exit_code,
                output.stdout,
                output.stderr,
            ));
        }

        let saved: HashMap<String, String> = parse_install_output(&output.stdout)
            .map(|file| (file.filename, file.declared_name))
            .collect();

        for file in downloaded_files(dir.path()) {
            let Some(key) = saved
                .get(&file)
                .cloned()
                .or_else(|| name_from_filename(&file))
                .map(|name| canonical_name(&name))
            else {
                debug!(file = %file, "cannot tell which package a download belongs to");
                continue;
            };
            let version = parse_version(&file, &key);

            let declared_constraint = declared.get(&key).copied();
            if !is_applicable(declared_constraint, &version)? {
                debug!(package = %key, version = %version, "does not satisfy declared specifier");
                continue;
            }

            let mut locked = LockedPackage::pinned(&version);
            locked.markers = declared_constraint.and_then(|c| c.markers.clone());
            if want_hashes {
                locked.hashes = installer
                    .hash(&dir.path().join(&file))?
                    .into_iter()
                    .collect::<BTreeSet<_>>();
            }

            let name = display_name(declared_constraint, &file, &key);
            debug!(package = %name, version = %version, "resolved");
            if let Some(previous) = pinned_as.insert(key, name.clone()) {
                resolution.packages.remove(&previous);
            }
            resolution.packages.insert(name, locked);
        }
    }

    Ok(resolution)
}

/// Download `requirement` from the first source that has it
///
/// Every attempt gets a fresh scratch directory, so files left by a failed source
/// never reach the resolution. The directory of the last attempt is returned.
fn download(
    installer: &Installer<'_>,
    requirement: &str,
    sources: &[Source],
) -> Result<(TempDir, ProcessOutput)> {
    let mut last_dir = None;
    let output = for_each_source(sources, |source| {
        let dir = scratch_dir(DOWNLOAD_DIR_PREFIX)?;
        let output = installer.download(requirement, source, dir.path())?;
        last_dir = Some(dir);
        Ok(output)
    })?;
    let dir = last_dir.ok_or(PinenvError::NoSources)?;
    Ok((dir, output))
}

/// Declared name, else the distribution's own name when it matches `key`
fn display_name(declared: Option<&DependencyConstraint>, file: &str, key: &str) -> String {
    if let Some(constraint) = declared {
        return constraint.name.clone();
    }
    distribution_name(file)
        .filter(|name| canonical_name(name) == key)
        .unwrap_or_else(|| key.to_string())
}

/// Whether `version` may be pinned for a package declared as `constraint`
///
/// Undeclared (transitive) packages are always accepted. An unparseable version only
/// satisfies an unconstrained declaration.
fn is_applicable(constraint: Option<&DependencyConstraint>, version: &str) -> Result<bool> {
    let Some(spec) = constraint.and_then(|c| c.version_spec.as_deref()) else {
        return Ok(true);
    };
    Ok(VersionSpecifiers::parse(spec)?.contains_str(version))
}

/// Files directly inside `dir`, sorted by name
fn downloaded_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}
