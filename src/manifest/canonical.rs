//! Versioned manifest canonicalization and hashing
//!
//! Scheme v1: the manifest is projected to a JSON document
//!
//! ```text
//! {"_meta": {"requires": {...}, "sources": [...]},
//!  "default": {<canonical name>: <constraint>}, "develop": {...}}
//! ```
//!
//! with sorted object keys and no insignificant whitespace. Packages are keyed by
//! canonical name so declaration order, key casing and formatting never change the
//! hash. Sources keep their declared order since it decides which index wins. The
//! bytes are prefixed with [`HASH_DOMAIN`] and hashed with BLAKE3.

use serde_json::{Map, Value, json};

use super::{DependencyConstraint, DependencyGroup, Manifest};
use crate::error::Result;

/// Version of the canonicalization scheme, recorded in the lock file
pub const HASH_VERSION: u32 = 1;

/// Hash algorithm key in `_meta.hash`
pub const HASH_ALGORITHM: &str = "blake3";

/// Domain separator prefixed to the canonical bytes
const HASH_DOMAIN: &[u8] = b"pinenv-manifest-v1\0";

/// Canonical JSON projection of a manifest
pub fn canonical_document(manifest: &Manifest) -> Result<Value> {
    let mut doc = Map::new();

    let sources: Vec<Value> = manifest
        .sources()
        .iter()
        .map(|source| {
            json!({
                "name": source.name,
                "url": source.url,
                "verify_ssl": source.verify_ssl,
            })
        })
        .collect();
    doc.insert(
        "_meta".to_string(),
        json!({
            "requires": manifest.requires(),
            "sources": sources,
        }),
    );

    for group in DependencyGroup::ALL {
        let mut packages = Map::new();
        for constraint in manifest.constraints(group)? {
            packages.insert(constraint.key(), constraint_value(&constraint));
        }
        doc.insert(group.lock_key().to_string(), Value::Object(packages));
    }

    Ok(Value::Object(doc))
}

/// Hex digest of the canonical form of `manifest`
pub fn manifest_hash(manifest: &Manifest) -> Result<String> {
    let bytes = serde_json::to_vec(&canonical_document(manifest)?)?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(HASH_DOMAIN);
    hasher.update(&bytes);
    Ok(hasher.finalize().to_hex().to_string())
}

fn constraint_value(constraint: &DependencyConstraint) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "version".to_string(),
        Value::from(constraint.version_spec.as_deref().unwrap_or("*")),
    );
    if !constraint.extras.is_empty() {
        let extras: Vec<String> = constraint
            .extras
            .iter()
            .map(|e| e.to_lowercase())
            .collect();
        fields.insert("extras".to_string(), Value::from(extras));
    }
    if let Some(markers) = &constraint.markers {
        fields.insert("markers".to_string(), Value::from(markers.trim()));
    }
    if let Some(index) = &constraint.source_ref {
        fields.insert("index".to_string(), Value::from(index.as_str()));
    }
    if let Some(vcs) = &constraint.vcs {
        fields.insert(
            "vcs".to_string(),
            json!({
                "kind": vcs.kind.as_str(),
                "url": vcs.url,
                "ref": vcs.reference,
            }),
        );
    }
    if constraint.editable {
        fields.insert("editable".to_string(), Value::Bool(true));
    }
    Value::Object(fields)
}
