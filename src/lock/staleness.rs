//! Lock freshness relative to the manifest

use super::LockArtifact;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::manifest::canonical::{HASH_ALGORITHM, HASH_VERSION, manifest_hash};

/// Why a lock does or does not match its manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// No lock file
    Missing,
    /// The lock carries no manifest hash
    NoHash,
    /// The hash was computed with another canonicalization scheme
    SchemeChanged,
    /// The manifest changed since the lock was written
    HashMismatch,
}

/// Whether the lock still matches the manifest it was written for
pub fn check(manifest: &Manifest, lock: Option<&LockArtifact>) -> Result<Freshness> {
    let Some(lock) = lock else {
        return Ok(Freshness::Missing);
    };
    let Some(recorded) = lock.meta.hash.get(HASH_ALGORITHM) else {
        return Ok(Freshness::NoHash);
    };
    if lock.meta.hash_version != Some(HASH_VERSION) {
        return Ok(Freshness::SchemeChanged);
    }
    if *recorded != manifest_hash(manifest)? {
        return Ok(Freshness::HashMismatch);
    }
    Ok(Freshness::Fresh)
}

/// Whether the lock must be regenerated before it can be trusted
pub fn is_stale(manifest: &Manifest, lock: Option<&LockArtifact>) -> Result<bool> {
    let freshness = check(manifest, lock)?;
    tracing::debug!(?freshness, "lock freshness");
    Ok(freshness != Freshness::Fresh)
}
