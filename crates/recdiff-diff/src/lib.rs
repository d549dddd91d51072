//! Structural JSON diff for recdiff.
//!
//! Compares a source and a target JSON document and produces an RFC 6902
//! style edit script annotated for auditing: removals and replacements carry
//! the value they displaced, and removed records carry their identifying
//! attributes.
//!
//! # Key Types
//!
//! - [`JsonDiff`] -- Configured entry point (guard, index, generator, processor)
//! - [`DiffConfig`] -- Depth/event limits, identity attributes and guard map
//! - [`UnchangedIndex`] -- Pointers whose subtrees are equivalent on both sides
//! - [`PatchProcessor`] / [`FactoringProcessor`] / [`RecordingProcessor`] -- Event consumers
//! - [`equivalent`] -- Numeric-aware structural equality
//!
//! # Quick Start
//!
//! ```rust
//! use recdiff_diff::{DiffConfig, JsonDiff};
//! use serde_json::json;
//!
//! let engine = JsonDiff::new(DiffConfig::default()).unwrap();
//! let patch = engine
//!     .diff(&json!({"a": 1, "b": 2}), &json!({"a": 1, "b": 3}))
//!     .unwrap();
//! assert_eq!(patch.len(), 1);
//! assert_eq!(patch.operations()[0].op_name(), "replace");
//! ```

pub mod config;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod generator;
pub mod processor;
pub mod unchanged;

pub use config::{DiffConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_EVENTS};
pub use engine::{diff, DiffRequest, JsonDiff};
pub use equivalence::equivalent;
pub use error::{DiffError, DiffResult, Side};
pub use generator::Generator;
pub use processor::{
    DiffEvent, EventContext, FactoringProcessor, PatchProcessor, RecordingProcessor,
};
pub use unchanged::{unchanged_values, UnchangedIndex};
