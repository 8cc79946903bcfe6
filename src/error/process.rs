//! External process errors

use super::PinenvError;

/// Creates a spawn failure error
pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::ProcessSpawnFailed {
        program: program.into(),
        reason: reason.into(),
    }
}

/// Creates a timeout error
pub fn timed_out(program: impl Into<String>, seconds: u64) -> PinenvError {
    PinenvError::ProcessTimedOut {
        program: program.into(),
        seconds,
    }
}

/// Creates an interrupted error
pub fn interrupted(program: impl Into<String>) -> PinenvError {
    PinenvError::ProcessInterrupted {
        program: program.into(),
    }
}
