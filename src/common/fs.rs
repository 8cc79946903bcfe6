//! Common file system operations with unified error handling

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PinenvError, Result};

/// Write `content` to `path` atomically
///
/// The content goes to a temporary file in the destination directory, is flushed
/// and synced, and then renamed over `path`. Readers see either the previous file
/// or the complete new one.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| write_failed(path, &e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(path, &e))?;
    tmp.write_all(content).map_err(|e| write_failed(path, &e))?;
    tmp.flush().map_err(|e| write_failed(path, &e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_failed(path, &e))?;
    tmp.persist(path)?;

    Ok(())
}

/// Read a file to a string, mapping failures to [`PinenvError::FileReadFailed`]
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PinenvError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_failed(path: &Path, err: &std::io::Error) -> PinenvError {
    PinenvError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
