//! Attribute presence guard for recdiff.
//!
//! Before a document pair is diffed, the source document must pass a
//! pipeline of checks. The standard check requires that every element of a
//! configured array field (e.g. the `Entitlements` list of a role record)
//! carries a set of identifying attributes. A document that fails the guard
//! is never diffed; the caller receives the violation instead.
//!
//! # Quick Start
//!
//! ```rust
//! use recdiff_guard::{DocumentGuard, GuardMap};
//! use serde_json::json;
//!
//! let guard = DocumentGuard::from_map(&GuardMap::entitlements()).unwrap();
//! let doc = json!({"Entitlements": [{
//!     "Application Key": "121",
//!     "Entitlement Type": "UD_GROUPS_GROUPS",
//!     "Entitlement Name": "144~Network Security Role"
//! }]});
//! let report = guard.evaluate(&doc).unwrap();
//! assert!(report.is_passed());
//! ```

pub mod check;
pub mod checks;
pub mod config;
pub mod error;
pub mod guard;

pub use check::{CheckDecision, CheckResult, GuardCheck, Violation};
pub use checks::AttributePresenceCheck;
pub use config::{GuardMap, ENTITLEMENT_ATTRIBUTES};
pub use error::{GuardError, GuardResult};
pub use guard::{DocumentGuard, GuardReport};
