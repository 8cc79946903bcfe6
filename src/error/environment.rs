//! Target environment errors

use super::PinenvError;

/// Creates an environment creation error
pub fn creation_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::EnvironmentCreationFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an aborted-creation error
pub fn interrupted(path: impl Into<String>) -> PinenvError {
    PinenvError::EnvironmentInterrupted { path: path.into() }
}

/// Creates an environment removal error
pub fn removal_failed(path: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::EnvironmentRemovalFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a marker query error
pub fn marker_query_failed(reason: impl Into<String>) -> PinenvError {
    PinenvError::MarkerQueryFailed {
        reason: reason.into(),
    }
}
