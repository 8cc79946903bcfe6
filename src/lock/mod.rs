//! Lock file (Pipfile.lock) data structures and storage
//!
//! The lock records the exact pinned versions of both dependency groups, their
//! content hashes, the VCS dependencies, and metadata describing what the lock was
//! generated from. Serialization is canonical: object keys are sorted, indentation is
//! four spaces and the file ends with a newline, so the same lock always produces
//! the same bytes.
//!
//! Unknown keys (at the top level and inside `_meta`) are kept across a re-lock.

pub mod staleness;
pub mod synthesize;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::fs::{read_to_string, write_atomic};
use crate::error::{Result, manifest};
use crate::installer::Source;
use crate::manifest::{DependencyConstraint, DependencyGroup, VcsKind, VcsSpec};

pub use staleness::is_stale;
pub use synthesize::synthesize;

/// File name of the lock next to the manifest
pub const LOCK_FILE: &str = "Pipfile.lock";

/// Pipfile.lock contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockArtifact {
    #[serde(rename = "_meta", default)]
    pub meta: LockMeta,

    #[serde(default)]
    pub default: BTreeMap<String, LockedPackage>,

    #[serde(default)]
    pub develop: BTreeMap<String, LockedPackage>,

    #[serde(rename = "default-vcs", default)]
    pub default_vcs: BTreeMap<String, LockedVcsPackage>,

    #[serde(rename = "develop-vcs", default)]
    pub develop_vcs: BTreeMap<String, LockedVcsPackage>,

    /// Top-level keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `_meta` section of the lock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockMeta {
    /// Manifest hash by algorithm name
    #[serde(default)]
    pub hash: BTreeMap<String, String>,

    /// Version of the manifest canonicalization scheme behind `hash`
    #[serde(
        rename = "hash-version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hash_version: Option<u32>,

    #[serde(rename = "host-environment-markers", default)]
    pub host_environment_markers: BTreeMap<String, String>,

    #[serde(default)]
    pub requires: BTreeMap<String, String>,

    #[serde(default)]
    pub sources: Vec<Source>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A pinned registry package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    /// Exact pin, `==<version>`
    pub version: String,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hashes: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<String>,
}

impl LockedPackage {
    pub fn pinned(version: &str) -> Self {
        Self {
            version: format!("=={}", version),
            ..Self::default()
        }
    }

    /// Version without the `==` prefix
    pub fn bare_version(&self) -> &str {
        self.version.trim_start_matches("==")
    }
}

/// A VCS dependency, recorded as declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedVcsPackage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bzr: Option<String>,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub editable: bool,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub extras: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<String>,
}

impl LockedVcsPackage {
    /// Lock entry for a VCS constraint, `None` for registry constraints
    pub fn from_constraint(constraint: &DependencyConstraint) -> Option<Self> {
        let vcs = constraint.vcs.as_ref()?;
        let mut locked = Self {
            reference: vcs.reference.clone(),
            editable: constraint.editable,
            extras: constraint.extras.clone(),
            markers: constraint.markers.clone(),
            ..Self::default()
        };
        *locked.url_slot(vcs.kind) = Some(vcs.url.clone());
        Some(locked)
    }

    fn url_slot(&mut self, kind: VcsKind) -> &mut Option<String> {
        match kind {
            VcsKind::Git => &mut self.git,
            VcsKind::Hg => &mut self.hg,
            VcsKind::Svn => &mut self.svn,
            VcsKind::Bzr => &mut self.bzr,
        }
    }

    pub fn vcs_spec(&self) -> Option<VcsSpec> {
        let (kind, url) = [
            (VcsKind::Git, &self.git),
            (VcsKind::Hg, &self.hg),
            (VcsKind::Svn, &self.svn),
            (VcsKind::Bzr, &self.bzr),
        ]
        .into_iter()
        .find_map(|(kind, url)| url.as_ref().map(|url| (kind, url.clone())))?;
        Some(VcsSpec {
            kind,
            url,
            reference: self.reference.clone(),
        })
    }

    /// Constraint to install this entry under `name`
    pub fn to_constraint(&self, name: &str) -> Option<DependencyConstraint> {
        Some(DependencyConstraint {
            vcs: Some(self.vcs_spec()?),
            editable: self.editable,
            extras: self.extras.clone(),
            markers: self.markers.clone(),
            ..DependencyConstraint::new(name)
        })
    }
}

impl LockArtifact {
    pub fn packages(&self, group: DependencyGroup) -> &BTreeMap<String, LockedPackage> {
        match group {
            DependencyGroup::Default => &self.default,
            DependencyGroup::Develop => &self.develop,
        }
    }

    pub fn vcs_packages(&self, group: DependencyGroup) -> &BTreeMap<String, LockedVcsPackage> {
        match group {
            DependencyGroup::Default => &self.default_vcs,
            DependencyGroup::Develop => &self.develop_vcs,
        }
    }

    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| manifest::lock_parse_failed(path.display().to_string(), e.to_string()))
    }

    /// Canonical serialization: sorted keys, 4-space indent, trailing newline
    pub fn to_canonical_json(&self) -> Result<String> {
        // Going through Value sorts every object, including flattened extras
        let value = serde_json::to_value(self)?;
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
        buf.push(b'\n');
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Loads and saves Pipfile.lock
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// The lock on disk, or `None` when there is none yet
    pub fn load(&self) -> Result<Option<LockArtifact>> {
        if !self.exists() {
            return Ok(None);
        }
        let text = read_to_string(&self.path)?;
        LockArtifact::from_json(&text, &self.path).map(Some)
    }

    pub fn save(&self, lock: &LockArtifact) -> Result<()> {
        write_atomic(&self.path, lock.to_canonical_json()?.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOCK: &str = r#"{
    "_meta": {
        "hash": {"blake3": "abc"},
        "hash-version": 1,
        "pipfile-spec": 6,
        "requires": {"python_version": "3.11"},
        "sources": [{"name": "pypi", "url": "https://pypi.org/simple", "verify_ssl": true}]
    },
    "default": {
        "requests": {"version": "==2.31.0", "hashes": ["sha256:bb", "sha256:aa"]}
    },
    "develop": {},
    "default-vcs": {
        "tool": {"git": "https://github.com/org/tool.git", "ref": "v1", "editable": true}
    },
    "generator": "other-tool"
}"#;

    #[test]
    fn test_parse_lock() {
        let lock = LockArtifact::from_json(LOCK, Path::new(LOCK_FILE)).unwrap();
        assert_eq!(lock.meta.hash.get("blake3").map(String::as_str), Some("abc"));
        assert_eq!(lock.meta.hash_version, Some(1));
        assert_eq!(lock.default["requests"].bare_version(), "2.31.0");
        assert_eq!(lock.default["requests"].hashes.len(), 2);
        assert!(lock.develop_vcs.is_empty());
        assert_eq!(lock.meta.extra["pipfile-spec"], Value::from(6));
        assert_eq!(lock.extra["generator"], Value::from("other-tool"));
    }

    #[test]
    fn test_canonical_json_sorts_keys_and_ends_with_newline() {
        let lock = LockArtifact::from_json(LOCK, Path::new(LOCK_FILE)).unwrap();
        let json = lock.to_canonical_json().unwrap();

        assert!(json.ends_with("}\n"));
        assert!(json.starts_with("{\n    \"_meta\": {\n        \"hash\": {"));
        let default_at = json.find("\"default\":").unwrap();
        let default_vcs_at = json.find("\"default-vcs\":").unwrap();
        let generator_at = json.find("\"generator\":").unwrap();
        assert!(default_at < default_vcs_at && default_vcs_at < generator_at);
        let aa = json.find("sha256:aa").unwrap();
        let bb = json.find("sha256:bb").unwrap();
        assert!(aa < bb);
    }

    #[test]
    fn test_canonical_json_is_stable() {
        let lock = LockArtifact::from_json(LOCK, Path::new(LOCK_FILE)).unwrap();
        let once = lock.to_canonical_json().unwrap();
        let reparsed = LockArtifact::from_json(&once, Path::new(LOCK_FILE)).unwrap();
        assert_eq!(reparsed, lock);
        assert_eq!(reparsed.to_canonical_json().unwrap(), once);
    }

    #[test]
    fn test_vcs_entry_round_trip_through_constraint() {
        let lock = LockArtifact::from_json(LOCK, Path::new(LOCK_FILE)).unwrap();
        let constraint = lock.default_vcs["tool"].to_constraint("tool").unwrap();
        assert!(constraint.editable);
        assert_eq!(
            constraint.vcs.as_ref().map(|v| v.installer_url("tool")).as_deref(),
            Some("git+https://github.com/org/tool.git@v1#egg=tool")
        );
        assert_eq!(
            LockedVcsPackage::from_constraint(&constraint).as_ref(),
            Some(&lock.default_vcs["tool"])
        );
        assert_eq!(
            LockedVcsPackage::from_constraint(&DependencyConstraint::new("requests")),
            None
        );
    }

    #[test]
    fn test_parse_failure_names_the_file() {
        let err = LockArtifact::from_json("{not json", Path::new("/p/Pipfile.lock")).unwrap_err();
        assert!(err.to_string().contains("/p/Pipfile.lock"));
    }

    #[test]
    fn test_store_load_missing_and_save() {
        let temp = TempDir::new().unwrap();
        let store = LockStore::new(temp.path().join(LOCK_FILE));
        assert!(store.load().unwrap().is_none());

        let mut lock = LockArtifact::default();
        lock.default
            .insert("alpha".to_string(), LockedPackage::pinned("1.0"));
        store.save(&lock).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), Some(lock));
    }
}
