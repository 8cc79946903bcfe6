//! Error types and handling for pinenv
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`process`]: External process errors
//! - [`environment`]: Target environment errors
//! - [`install`]: Resolution and installation errors
//! - [`manifest`]: Manifest and lock errors
//! - [`registry`]: Package index lookup errors
//! - [`fs`]: File system errors

pub mod environment;
pub mod fs;
pub mod install;
pub mod manifest;
pub mod process;
pub mod registry;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pinenv operations
#[derive(Error, Diagnostic, Debug)]
pub enum PinenvError {
    // Process errors
    #[error("Failed to run '{program}': {reason}")]
    #[diagnostic(
        code(pinenv::process::spawn_failed),
        help("Check that the program is installed and on PATH")
    )]
    ProcessSpawnFailed { program: String, reason: String },

    #[error("'{program}' did not finish within {seconds}s")]
    #[diagnostic(
        code(pinenv::process::timed_out),
        help("Raise PINENV_TIMEOUT if the operation legitimately takes longer")
    )]
    ProcessTimedOut { program: String, seconds: u64 },

    #[error("'{program}' was interrupted")]
    #[diagnostic(code(pinenv::process::interrupted))]
    ProcessInterrupted { program: String },

    // Environment errors
    #[error("Failed to create environment at {path}: {reason}")]
    #[diagnostic(
        code(pinenv::environment::creation_failed),
        help("Check that the environment manager is installed and the interpreter exists")
    )]
    EnvironmentCreationFailed { path: String, reason: String },

    #[error("Environment creation aborted")]
    #[diagnostic(code(pinenv::environment::interrupted))]
    EnvironmentInterrupted { path: String },

    #[error("Failed to remove environment at {path}: {reason}")]
    #[diagnostic(code(pinenv::environment::removal_failed))]
    EnvironmentRemovalFailed { path: String, reason: String },

    #[error("Failed to read host environment markers: {reason}")]
    #[diagnostic(code(pinenv::environment::marker_query_failed))]
    MarkerQueryFailed { reason: String },

    // Resolution errors
    #[error("Could not resolve '{requirement}' from any source")]
    #[diagnostic(
        code(pinenv::resolve::failed),
        help("Check the requirement spelling and that at least one [[source]] is reachable")
    )]
    ResolutionFailed {
        requirement: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("No package sources configured")]
    #[diagnostic(
        code(pinenv::resolve::no_sources),
        help("Add a [[source]] table to the Pipfile")
    )]
    NoSources,

    // Installation errors
    #[error("An error occurred while installing {package}!")]
    #[diagnostic(code(pinenv::install::failed))]
    InstallationFailed {
        package: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Hash verification failed while installing {package}")]
    #[diagnostic(
        code(pinenv::install::hash_mismatch),
        help("The downloaded files differ from Pipfile.lock. Run 'pinenv lock' if the change is expected")
    )]
    HashMismatch {
        package: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("No hash recorded for {package}")]
    #[diagnostic(
        code(pinenv::install::missing_hash),
        help("Run 'pinenv lock' to record hashes, or drop --require-hashes")
    )]
    MissingHash { package: String },

    #[error("Could not look up '{name}' on the package index: {reason}")]
    #[diagnostic(
        code(pinenv::registry::lookup_failed),
        help("Set PINENV_SKIP_VALIDATION=1 to skip name validation when offline")
    )]
    NameLookupFailed { name: String, reason: String },

    #[error("No package provided!")]
    #[diagnostic(code(pinenv::install::no_package))]
    NoPackageProvided,

    // Manifest and lock errors
    #[error("Failed to parse Pipfile: {path}: {reason}")]
    #[diagnostic(code(pinenv::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid requirement '{input}': {reason}")]
    #[diagnostic(
        code(pinenv::manifest::invalid_requirement),
        help("Use the form name[extras]<specifier>; markers or -e <vcs>+<url>#egg=name")
    )]
    InvalidRequirement { input: String, reason: String },

    #[error("Failed to parse Pipfile.lock: {path}: {reason}")]
    #[diagnostic(
        code(pinenv::lock::parse_failed),
        help("Delete Pipfile.lock and run 'pinenv lock' to regenerate it")
    )]
    LockParseFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(pinenv::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(pinenv::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pinenv::fs::io_error))]
    IoError { message: String },
}

impl PinenvError {
    /// Process exit code for this error
    ///
    /// Installation failures hand the installer's own exit code back to the shell.
    pub fn exit_code(&self) -> i32 {
        match self {
            PinenvError::InstallationFailed { exit_code, .. }
            | PinenvError::HashMismatch { exit_code, .. }
                if *exit_code != 0 =>
            {
                *exit_code
            }
            _ => 1,
        }
    }

    /// Captured stdout/stderr of the external tool behind this error, if any
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            PinenvError::InstallationFailed { stdout, stderr, .. }
            | PinenvError::HashMismatch { stdout, stderr, .. }
            | PinenvError::ResolutionFailed { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for PinenvError {
    fn from(err: std::io::Error) -> Self {
        PinenvError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PinenvError {
    fn from(err: serde_json::Error) -> Self {
        PinenvError::LockParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<toml_edit::TomlError> for PinenvError {
    fn from(err: toml_edit::TomlError) -> Self {
        PinenvError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<tempfile::PersistError> for PinenvError {
    fn from(err: tempfile::PersistError) -> Self {
        PinenvError::FileWriteFailed {
            path: err.file.path().display().to_string(),
            reason: err.error.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PinenvError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_code() {
        let err = PinenvError::NoSources;
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("pinenv::resolve::no_sources".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PinenvError = io_err.into();
        assert!(matches!(err, PinenvError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("invalid json content");
        let err: PinenvError = parse_result.unwrap_err().into();
        assert!(matches!(err, PinenvError::LockParseFailed { .. }));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse_result = "[packages\n".parse::<toml_edit::DocumentMut>();
        let err: PinenvError = parse_result.unwrap_err().into();
        assert!(matches!(err, PinenvError::ManifestParseFailed { .. }));
    }

    #[test]
    fn test_installation_failure_exit_code_is_propagated() {
        let err = install::failed("requests", 2, "out", "err");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.captured_output(), Some(("out", "err")));
    }

    #[test]
    fn test_hash_mismatch_exit_code_is_propagated() {
        let err = install::hash_mismatch("requests", 1, "", "THESE PACKAGES DO NOT MATCH");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_generic_errors_exit_with_one() {
        assert_eq!(PinenvError::NoSources.exit_code(), 1);
        assert_eq!(
            environment::interrupted("/tmp/env").exit_code(),
            1
        );
        assert_eq!(PinenvError::NoSources.captured_output(), None);
    }

    test_error_contains!(
        test_installation_failed_message,
        install::failed("flask", 1, "", ""),
        "installing flask"
    );

    test_error_contains!(
        test_resolution_failed_message,
        install::resolution_failed("requests>=2.0", 1, "", "no matching distribution"),
        "Could not resolve",
        "requests>=2.0"
    );

    test_error_contains!(
        test_timed_out_message,
        process::timed_out("virtualenv", 120),
        "virtualenv",
        "120s"
    );

    test_error_contains!(
        test_environment_interrupted_message,
        environment::interrupted("/tmp/env"),
        "aborted"
    );

    test_error_contains!(
        test_invalid_requirement_message,
        manifest::invalid_requirement("==1.0", "missing package name"),
        "Invalid requirement",
        "==1.0"
    );

    test_error_contains!(
        test_name_lookup_failed_message,
        registry::lookup_failed("reqeusts", "404 Not Found"),
        "reqeusts",
        "404"
    );

    test_error_contains!(
        test_file_write_failed_message,
        fs::write_failed("/tmp/Pipfile.lock", "disk full"),
        "Failed to write file"
    );
}
