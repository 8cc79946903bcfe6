//! Base directory for scratch directories
//!
//! Download and requirement scratch space must never land under the project directory,
//! which happens when `TMPDIR` is relative (e.g. `TMPDIR=tmp`).

use std::env;
use std::path::PathBuf;

use tempfile::{Builder, TempDir};

use crate::error::{Result, fs};

/// Absolute directory suitable for temporary files
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Scoped scratch directory, removed when dropped
pub fn scratch_dir(prefix: &str) -> Result<TempDir> {
    let base = temp_dir_base();
    Builder::new()
        .prefix(prefix)
        .tempdir_in(&base)
        .map_err(|e| fs::write_failed(base.display().to_string(), e.to_string()))
}
