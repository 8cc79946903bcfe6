//! File system errors

use super::PinenvError;

/// Creates a file read error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
