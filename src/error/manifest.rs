//! Manifest and lock errors

use super::PinenvError;

/// Creates a manifest parse error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::ManifestParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid requirement error
pub fn invalid_requirement(input: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::InvalidRequirement {
        input: input.into(),
        reason: reason.into(),
    }
}

/// Creates a lock parse error
pub fn lock_parse_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::LockParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
