//! Foundation types for recdiff.
//!
//! Every other recdiff crate depends on `recdiff-types`. It carries the
//! addressing scheme used to locate values inside a JSON document and the
//! edit operations a diff produces.
//!
//! # Key Types
//!
//! - [`Pointer`] / [`Token`] -- RFC 6901 JSON Pointer, addressing a value by keys and indices
//! - [`PatchOperation`] -- A single edit (add, remove, replace, move, copy)
//! - [`Patch`] -- An ordered sequence of edits
//! - [`TypeError`] -- Pointer parse and serialization failures

pub mod error;
pub mod operation;
pub mod patch;
pub mod pointer;

pub use error::TypeError;
pub use operation::PatchOperation;
pub use patch::Patch;
pub use pointer::{Pointer, Token};
