//! Package index lookup errors

use super::PinenvError;

/// Creates a name lookup failure error
pub fn lookup_failed(name: impl Into<String>, reason: impl Into<String>) -> PinenvError {
    PinenvError::NameLookupFailed {
        name: name.into(),
        reason: reason.into(),
    }
}
