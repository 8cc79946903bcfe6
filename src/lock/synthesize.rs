//! Building a lock from resolutions

use std::collections::BTreeMap;

use super::LockArtifact;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::manifest::canonical::{HASH_ALGORITHM, HASH_VERSION, manifest_hash};
use crate::resolver::Resolution;

/// Produce the lock for `manifest` from fresh resolutions of both groups
///
/// Unknown keys of `previous` survive; the four package maps are replaced outright.
/// The same inputs always produce the same lock.
pub fn synthesize(
    previous: Option<&LockArtifact>,
    manifest: &Manifest,
    default: Resolution,
    develop: Resolution,
    host_markers: BTreeMap<String, String>,
) -> Result<LockArtifact> {
    let mut lock = previous.map_or_else(LockArtifact::default, |previous| LockArtifact {
        meta: previous.meta.clone(),
        extra: previous.extra.clone(),
        ..LockArtifact::default()
    });

    lock.meta.hash = BTreeMap::from([(HASH_ALGORITHM.to_string(), manifest_hash(manifest)?)]);
    lock.meta.hash_version = Some(HASH_VERSION);
    lock.meta.requires = manifest.requires();
    lock.meta.sources = manifest.sources();
    lock.meta.host_environment_markers = host_markers;

    lock.default = default.packages;
    lock.default_vcs = default.vcs;
    lock.develop = develop.packages;
    lock.develop_vcs = develop.vcs;

    Ok(lock)
}
