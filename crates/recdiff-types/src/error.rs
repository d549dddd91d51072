use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid pointer {pointer:?}: {reason}")]
    InvalidPointer { pointer: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    pub(crate) fn pointer(pointer: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }
}
