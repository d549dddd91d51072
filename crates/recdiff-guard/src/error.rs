use std::fmt;

/// Errors that can occur while building or running the guard.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The guard configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A check returned an unexpected error.
    #[error("check error in '{check}': {message}")]
    CheckError { check: String, message: String },

    /// Serialization of the guard configuration failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GuardError {
    /// Create a check error with a name and message.
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckError {
            check: check.into(),
            message: message.into(),
        }
    }
}

impl PartialEq for GuardError {
    fn eq(&self, other: &Self) -> bool {
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GuardError {}

/// Convenience alias for guard results.
pub type GuardResult<T> = Result<T, GuardError>;
