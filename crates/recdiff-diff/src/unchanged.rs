//! Unchanged-subtree index.
//!
//! Co-traverses source and target from the root and records every pointer
//! at which both sides hold equivalent values. Once a pair is equivalent the
//! walk stops descending: the entry certifies the whole subtree. The index
//! is handed to the patch processor, which uses it to turn additions of
//! already-present values into copies.

use std::collections::BTreeMap;

use recdiff_types::Pointer;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::equivalence::equivalent;
use crate::error::{DiffError, DiffResult};

/// Pointers whose subtrees are equivalent in source and target, mapped to
/// the target-side value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnchangedIndex<'a> {
    entries: BTreeMap<Pointer, &'a Value>,
}

impl<'a> UnchangedIndex<'a> {
    /// Build the index for a document pair.
    ///
    /// Fails with [`DiffError::DepthExceeded`] if the traversal would descend
    /// more than `max_depth` containers below the root.
    pub fn build(source: &'a Value, target: &'a Value, max_depth: usize) -> DiffResult<Self> {
        let mut index = Self::default();
        index.compute(&Pointer::root(), source, target, 0, max_depth)?;
        Ok(index)
    }

    /// Returns `true` if nothing was found unchanged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded pointers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if `pointer` was recorded.
    pub fn contains(&self, pointer: &Pointer) -> bool {
        self.entries.contains_key(pointer)
    }

    /// Iterate over entries in pointer order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &'a Value)> + '_ {
        self.entries.iter().map(|(p, v)| (p, *v))
    }

    /// The first pointer (in pointer order) whose value is equivalent to
    /// `value`.
    pub fn find_equivalent(&self, value: &Value) -> Option<&Pointer> {
        self.entries
            .iter()
            .find(|(_, unchanged)| equivalent(value, unchanged))
            .map(|(pointer, _)| pointer)
    }

    /// Clone the index into an owned map.
    pub fn to_map(&self) -> BTreeMap<Pointer, Value> {
        self.entries
            .iter()
            .map(|(p, v)| (p.clone(), (*v).clone()))
            .collect()
    }

    fn compute(
        &mut self,
        pointer: &Pointer,
        first: &'a Value,
        second: &'a Value,
        depth: usize,
        max_depth: usize,
    ) -> DiffResult<()> {
        if equivalent(first, second) {
            self.entries.insert(pointer.clone(), second);
            return Ok(());
        }

        match (first, second) {
            (Value::Object(source), Value::Object(target)) => {
                for (name, value) in source {
                    let Some(other) = target.get(name) else {
                        continue;
                    };
                    let child = pointer.append(name);
                    check_depth(&child, depth + 1, max_depth)?;
                    self.compute(&child, value, other, depth + 1, max_depth)?;
                }
            }
            (Value::Array(source), Value::Array(target)) => {
                for (i, (value, other)) in source.iter().zip(target.iter()).enumerate() {
                    let child = pointer.append(i);
                    check_depth(&child, depth + 1, max_depth)?;
                    self.compute(&child, value, other, depth + 1, max_depth)?;
                }
            }
            // Different kinds, or unequal scalars: nothing in common.
            _ => {}
        }

        Ok(())
    }
}

impl Serialize for UnchangedIndex<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(p, v)| (p.to_string(), *v)))
    }
}

pub(crate) fn check_depth(pointer: &Pointer, depth: usize, max_depth: usize) -> DiffResult<()> {
    if depth > max_depth {
        return Err(DiffError::DepthExceeded {
            limit: max_depth,
            pointer: pointer.clone(),
        });
    }
    Ok(())
}

/// Build the unchanged index with the default depth limit.
pub fn unchanged_values<'a>(
    source: &'a Value,
    target: &'a Value,
) -> DiffResult<UnchangedIndex<'a>> {
    UnchangedIndex::build(source, target, DEFAULT_MAX_DEPTH)
}
