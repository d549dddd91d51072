//! Edit operations produced by a diff.
//!
//! The wire form follows RFC 6902 with an `"op"` tag. `remove` and `replace`
//! additionally carry the value they displace (`original_value`), and a
//! `remove` may carry the identity attributes of the record it was taken
//! from (`context`) so that an audit trail can name what disappeared.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pointer::Pointer;

/// A single edit operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert `value` at `path`.
    Add { path: Pointer, value: Value },
    /// Remove the value at `path`.
    Remove {
        path: Pointer,
        original_value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
    /// Replace the value at `path`.
    Replace {
        path: Pointer,
        original_value: Value,
        value: Value,
    },
    /// Relocate the value at `from` to `path`.
    Move { from: Pointer, path: Pointer },
    /// Duplicate the value at `from` to `path`.
    Copy { from: Pointer, path: Pointer },
}

impl PatchOperation {
    /// The RFC 6902 operation name.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
            Self::Move { .. } => "move",
            Self::Copy { .. } => "copy",
        }
    }

    /// The target location of the operation.
    pub fn path(&self) -> &Pointer {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path, .. }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. } => path,
        }
    }

    /// The source location for `move` and `copy`.
    pub fn from(&self) -> Option<&Pointer> {
        match self {
            Self::Move { from, .. } | Self::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// The value written by the operation, if it carries one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The value displaced by the operation, if it carries one.
    pub fn original_value(&self) -> Option<&Value> {
        match self {
            Self::Remove { original_value, .. } | Self::Replace { original_value, .. } => {
                Some(original_value)
            }
            _ => None,
        }
    }
}
