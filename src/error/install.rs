//! Resolution and installation errors

use super::PinenvError;

/// Creates a resolution failure carrying the last source's output
pub fn resolution_failed(
    requirement: impl Into<String>,
    exit_code: i32,
    stdout: impl Into<String>,
    stderr: impl Into<String>,
) -> PinenvError {
    PinenvError::ResolutionFailed {
        requirement: requirement.into(),
        exit_code,
        stdout: stdout.into(),
        stderr: stderr.into(),
    }
}

/// Creates an installation failure carrying the installer's output
pub fn failed(
    package: impl Into<String>,
    exit_code: i32,
    stdout: impl Into<String>,
    stderr: impl Into<String>,
) -> PinenvError {
    PinenvError::InstallationFailed {
        package: package.into(),
        exit_code,
        stdout: stdout.into(),
        stderr: stderr.into(),
    }
}

/// Creates a hash mismatch error carrying the installer's output
pub fn hash_mismatch(
    package: impl Into<String>,
    exit_code: i32,
    stdout: impl Into<String>,
    stderr: impl Into<String>,
) -> PinenvError {
    PinenvError::HashMismatch {
        package: package.into(),
        exit_code,
        stdout: stdout.into(),
        stderr: stderr.into(),
    }
}

/// Creates a missing hash error for strict hash mode
pub fn missing_hash(package: impl Into<String>) -> PinenvError {
    PinenvError::MissingHash {
        package: package.into(),
    }
}
