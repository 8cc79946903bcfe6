//! Rollback of partially created state
//!
//! Long-running steps that create directories (environment creation in particular)
//! register them with a [`Transaction`]. Unless the transaction is committed, dropping
//! it removes everything it tracked, so failures, timeouts, interrupts and panics
//! never leave a half-built directory behind.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new();
//! transaction.track_dir_created(&location);
//!
//! // Perform operations...
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Result, fs as fs_error};

/// Tracks created directories and removes them unless committed
#[derive(Debug, Default)]
pub struct Transaction {
    /// Directories created during this transaction, in creation order
    created_dirs: Vec<PathBuf>,

    /// Whether the transaction has been committed
    committed: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a directory that was created during this transaction
    pub fn track_dir_created(&mut self, path: impl Into<PathBuf>) {
        self.created_dirs.push(path.into());
    }

    /// Commit the transaction (prevent rollback)
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Remove everything tracked so far, newest first
    pub fn rollback(&mut self) -> Result<()> {
        if self.committed {
            return Ok(());
        }

        for dir in self.created_dirs.drain(..).rev() {
            if !dir.exists() {
                continue;
            }
            debug!(path = %dir.display(), "rolling back");
            fs::remove_dir_all(&dir)
                .map_err(|e| fs_error::write_failed(dir.display().to_string(), e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = self.rollback() {
                warn!("Rollback failed: {}", e);
            }
        }
    }
}
