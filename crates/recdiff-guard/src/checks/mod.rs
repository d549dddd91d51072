//! Built-in guard checks.

pub mod attribute_presence;

pub use attribute_presence::AttributePresenceCheck;
