use std::collections::{BTreeMap, BTreeSet};

use recdiff_types::Pointer;
use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// The attributes every record of an entitlement list is expected to carry.
pub const ENTITLEMENT_ATTRIBUTES: [&str; 3] =
    ["Application Key", "Entitlement Type", "Entitlement Name"];

/// Required attributes for each guarded array field.
///
/// Keyed by the pointer of the array (e.g. `/Entitlements`). Every element
/// of that array must contain every listed attribute as a key.
///
/// In configuration files pointers may omit the leading `/`:
///
/// ```toml
/// [guards]
/// Entitlements = ["Application Key", "Entitlement Type", "Entitlement Name"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, BTreeSet<String>>",
    into = "BTreeMap<String, BTreeSet<String>>"
)]
pub struct GuardMap {
    entries: BTreeMap<Pointer, BTreeSet<String>>,
}

impl GuardMap {
    /// An empty map: every document passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard entitlement guard: `/Entitlements` must hold records
    /// carrying [`ENTITLEMENT_ATTRIBUTES`].
    pub fn entitlements() -> Self {
        let mut map = Self::new();
        map.insert(
            Pointer::root().append("Entitlements"),
            ENTITLEMENT_ATTRIBUTES.iter().map(|a| a.to_string()),
        );
        map
    }

    /// Add (or extend) the required attribute set for `pointer`.
    pub fn insert<I, S>(&mut self, pointer: Pointer, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(pointer)
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
    }

    /// Returns `true` if no array is guarded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of guarded arrays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over `(pointer, required attributes)` in pointer order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Check that every entry requires at least one attribute.
    pub fn validate(&self) -> Result<(), GuardError> {
        for (pointer, required) in &self.entries {
            if required.is_empty() {
                return Err(GuardError::Config(format!(
                    "guard at '{pointer}' has no required attributes"
                )));
            }
            if required.iter().any(|a| a.is_empty()) {
                return Err(GuardError::Config(format!(
                    "guard at '{pointer}' lists an empty attribute name"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, BTreeSet<String>>> for GuardMap {
    type Error = GuardError;

    fn try_from(raw: BTreeMap<String, BTreeSet<String>>) -> Result<Self, Self::Error> {
        let mut map = Self::new();
        for (text, required) in raw {
            let pointer = Pointer::parse_relaxed(&text)
                .map_err(|e| GuardError::Config(e.to_string()))?;
            // `Entitlements` and `/Entitlements` name the same array.
            map.insert(pointer, required);
        }
        Ok(map)
    }
}

impl From<GuardMap> for BTreeMap<String, BTreeSet<String>> {
    fn from(map: GuardMap) -> Self {
        map.entries
            .into_iter()
            .map(|(pointer, required)| (pointer.to_string(), required))
            .collect()
    }
}
