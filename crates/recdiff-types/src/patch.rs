//! An ordered sequence of edit operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::operation::PatchOperation;

/// The result of a diff: operations in the order they were produced.
///
/// There is no guarantee that a patch is usable for any source/target pair
/// other than the one that generated it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Iterate over the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// The operations as a slice.
    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Consume the patch, returning its operations.
    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }

    /// Number of operations with the given RFC 6902 name.
    pub fn count(&self, op_name: &str) -> usize {
        self.operations
            .iter()
            .filter(|op| op.op_name() == op_name)
            .count()
    }

    /// Serialize to a JSON array.
    pub fn to_value(&self) -> Result<Value, TypeError> {
        serde_json::to_value(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<PatchOperation> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::Pointer;
    use serde_json::json;

    fn sample() -> Patch {
        vec![
            PatchOperation::Replace {
                path: Pointer::parse("/b").unwrap(),
                original_value: json!(2),
                value: json!(3),
            },
            PatchOperation::Add {
                path: Pointer::parse("/-").unwrap(),
                value: json!(4),
            },
            PatchOperation::Add {
                path: Pointer::parse("/-").unwrap(),
                value: json!(5),
            },
        ]
        .into()
    }

    #[test]
    fn empty_patch() {
        let patch = Patch::new();
        assert!(patch.is_empty());
        assert_eq!(patch.to_value().unwrap(), json!([]));
    }

    #[test]
    fn counts_by_kind() {
        let patch = sample();
        assert_eq!(patch.len(), 3);
        assert_eq!(patch.count("add"), 2);
        assert_eq!(patch.count("replace"), 1);
        assert_eq!(patch.count("remove"), 0);
    }

    #[test]
    fn serializes_as_plain_array() {
        let value = sample().to_value().unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(value[0]["op"], json!("replace"));
        assert_eq!(value[0]["path"], json!("/b"));
    }

    #[test]
    fn iteration_preserves_order() {
        let names: Vec<_> = sample().iter().map(PatchOperation::op_name).collect();
        assert_eq!(names, vec!["replace", "add", "add"]);
    }
}
