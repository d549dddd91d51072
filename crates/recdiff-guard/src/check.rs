use std::fmt;
use std::time::Duration;

use recdiff_types::Pointer;
use serde_json::Value;

use crate::error::GuardError;

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// Why a document was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// Nothing exists at the guarded pointer.
    MissingArray { pointer: Pointer },
    /// The guarded pointer addresses something other than an array.
    NotAnArray { pointer: Pointer, found: &'static str },
    /// An element lacks one or more required attributes.
    MissingAttributes {
        pointer: Pointer,
        index: usize,
        missing: Vec<String>,
    },
}

impl Violation {
    /// The guarded pointer the violation was found at.
    pub fn pointer(&self) -> &Pointer {
        match self {
            Self::MissingArray { pointer }
            | Self::NotAnArray { pointer, .. }
            | Self::MissingAttributes { pointer, .. } => pointer,
        }
    }

    /// Offending element index, for attribute violations.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::MissingAttributes { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Missing attribute names, sorted.
    pub fn missing(&self) -> &[String] {
        match self {
            Self::MissingAttributes { missing, .. } => missing,
            _ => &[],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArray { pointer } => write!(f, "no array at '{pointer}'"),
            Self::NotAnArray { pointer, found } => {
                write!(f, "expected an array at '{pointer}', found {found}")
            }
            Self::MissingAttributes {
                pointer,
                index,
                missing,
            } => write!(
                f,
                "element {index} of '{pointer}' is missing attributes: {}",
                missing.join(", ")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckDecision / CheckResult
// ---------------------------------------------------------------------------

/// The outcome of a single check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckDecision {
    /// The document satisfies the check.
    Pass,
    /// The document violates the check; diffing must not proceed.
    Fail(Violation),
}

impl CheckDecision {
    /// Returns `true` if the decision is `Pass`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns `true` if the decision is `Fail`.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Recorded result from a completed check.
#[derive(Clone, Debug)]
pub struct CheckResult {
    /// Name of the check that produced this result.
    pub check_name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Populated on failure.
    pub violation: Option<Violation>,
    /// Wall-clock time the check took.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GuardCheck trait
// ---------------------------------------------------------------------------

/// A single precondition evaluated against the source document.
///
/// Checks run in order and the pipeline stops at the first failure. The
/// trait is object-safe and `Send + Sync` so checks can be stored in a
/// `Vec<Box<dyn GuardCheck>>` and shared across threads.
pub trait GuardCheck: Send + Sync {
    /// Human-readable name of this check.
    fn name(&self) -> &str;

    /// Evaluate the document and return a decision.
    fn evaluate(&self, document: &Value) -> Result<CheckDecision, GuardError>;
}

/// A short name for the kind of a JSON value, used in messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
