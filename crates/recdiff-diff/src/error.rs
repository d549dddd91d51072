//! Error types for the diff crate.

use recdiff_guard::{GuardError, Violation};
use recdiff_types::Pointer;

/// Which side of a document pair an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// One side of the document pair is absent.
    #[error("{0} document is missing")]
    NullArgument(Side),

    /// The source document failed the attribute guard; no patch is produced.
    #[error("guard violation: {0}")]
    GuardViolation(Violation),

    /// The documents nest deeper than the configured limit.
    #[error("maximum depth {limit} exceeded at '{pointer}'")]
    DepthExceeded { limit: usize, pointer: Pointer },

    /// The diff produced more events than the configured limit.
    #[error("more than {limit} diff events")]
    TooManyEvents { limit: usize },

    /// The guard could not be built or evaluated.
    #[error("guard error: {0}")]
    Guard(#[from] GuardError),

    /// Configuration is invalid or could not be read.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
