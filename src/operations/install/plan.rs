//! Install plans
//!
//! A plan is the ordered list of things to hand the installer, built from the lock,
//! from the manifest (skip-lock mode), or from requirements given on the command line.

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::Result;
use crate::installer::InstallTarget;
use crate::lock::{LockArtifact, LockedPackage};
use crate::manifest::{DependencyConstraint, DependencyGroup, Manifest};

/// One installer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub package_name: String,
    pub target: InstallTarget,
    /// Acceptable `sha256:` digests; empty when unknown
    pub hashes: BTreeSet<String>,
    pub is_vcs: bool,
}

impl PlanEntry {
    fn from_locked(name: &str, locked: &LockedPackage) -> Self {
        let mut requirement = format!("{}{}", name, locked.version);
        if let Some(markers) = &locked.markers {
            requirement.push_str("; ");
            requirement.push_str(markers);
        }
        Self {
            package_name: name.to_string(),
            target: InstallTarget::Requirement(requirement),
            hashes: locked.hashes.clone(),
            is_vcs: false,
        }
    }

    pub fn from_constraint(constraint: &DependencyConstraint) -> Self {
        Self {
            package_name: constraint.name.clone(),
            target: constraint.install_target(),
            hashes: BTreeSet::new(),
            is_vcs: constraint.is_vcs(),
        }
    }

    /// Requirement-file line: the requirement followed by every `--hash=` option
    pub fn requirement_line(&self) -> String {
        let mut line = match &self.target {
            InstallTarget::Requirement(requirement) => requirement.clone(),
            InstallTarget::Editable(url) => format!("-e {}", url),
            InstallTarget::RequirementFile(path) => format!("-r {}", path.display()),
        };
        for hash in &self.hashes {
            line.push_str(" --hash=");
            line.push_str(hash);
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub entries: Vec<PlanEntry>,
}

impl InstallPlan {
    /// Pinned `default` [+ `develop`] packages, then the VCS entries of the same groups
    pub fn from_lock(lock: &LockArtifact, dev: bool) -> Self {
        let groups = groups(dev);
        let mut entries = Vec::new();

        for group in groups {
            entries.extend(
                lock.packages(*group)
                    .iter()
                    .map(|(name, locked)| PlanEntry::from_locked(name, locked)),
            );
        }
        for group in groups {
            for (name, locked) in lock.vcs_packages(*group) {
                match locked.to_constraint(name) {
                    Some(constraint) => entries.push(PlanEntry::from_constraint(&constraint)),
                    None => warn!(package = %name, "lock entry names no repository, skipping"),
                }
            }
        }

        Self { entries }
    }

    /// Declared constraints, unpinned and without hashes, registry packages first
    pub fn from_manifest(manifest: &Manifest, dev: bool) -> Result<Self> {
        let mut constraints = Vec::new();
        for group in groups(dev) {
            constraints.extend(manifest.constraints(*group)?);
        }
        Ok(Self::from_constraints(&constraints))
    }

    pub fn from_constraints(constraints: &[DependencyConstraint]) -> Self {
        let (vcs, registry): (Vec<_>, Vec<_>) = constraints.iter().partition(|c| c.is_vcs());
        Self {
            entries: registry
                .into_iter()
                .chain(vcs)
                .map(PlanEntry::from_constraint)
                .collect(),
        }
    }

    /// The plan as `requirements.txt` lines
    pub fn requirement_lines(&self) -> Vec<String> {
        self.entries.iter().map(PlanEntry::requirement_line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn groups(dev: bool) -> &'static [DependencyGroup] {
    if dev {
        &DependencyGroup::ALL
    } else {
        &[DependencyGroup::Default]
    }
}
