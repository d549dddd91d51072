//! Patch processors: consumers of diff events.
//!
//! The generator reports every divergence as an event. A processor decides
//! what the final edit script looks like. [`FactoringProcessor`] is the
//! default and folds matching remove/add pairs into moves and additions of
//! unchanged values into copies. [`RecordingProcessor`] keeps the raw events.

use recdiff_types::{Patch, PatchOperation, Pointer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::equivalence::equivalent;
use crate::unchanged::UnchangedIndex;

// ---------------------------------------------------------------------------
// EventContext
// ---------------------------------------------------------------------------

/// Auxiliary data attached to an event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventContext<'a> {
    /// No context.
    None,
    /// The enclosing source container.
    Container(&'a Value),
    /// Identity attributes of the affected record, in configured order.
    Attributes(Vec<Value>),
}

impl EventContext<'_> {
    /// Convert to an owned JSON value.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Container(value) => Some(value.clone()),
            Self::Attributes(values) => Some(Value::Array(values)),
        }
    }
}

// ---------------------------------------------------------------------------
// PatchProcessor trait
// ---------------------------------------------------------------------------

/// Receives the events of one diff invocation.
///
/// A processor is owned by a single invocation; concurrent diffs each use
/// their own instance.
pub trait PatchProcessor {
    /// A value appeared at `path`.
    fn value_added(&mut self, path: Pointer, value: &Value, context: EventContext<'_>);

    /// A value disappeared; `path` is where it is reported.
    fn value_removed(&mut self, path: Pointer, old_value: &Value, context: EventContext<'_>);

    /// The value at `path` changed.
    fn value_replaced(
        &mut self,
        path: Pointer,
        old_value: &Value,
        new_value: &Value,
        context: EventContext<'_>,
    );

    /// Consume the processor and return the final edit script.
    fn into_patch(self) -> Patch
    where
        Self: Sized;
}

// ---------------------------------------------------------------------------
// FactoringProcessor
// ---------------------------------------------------------------------------

/// An operation as recorded by [`FactoringProcessor`], before conversion.
#[derive(Clone, Debug, PartialEq)]
enum DiffOperation {
    Add {
        path: Pointer,
        value: Value,
    },
    Remove {
        path: Pointer,
        old_value: Value,
        context: Option<Value>,
    },
    Replace {
        path: Pointer,
        old_value: Value,
        value: Value,
    },
    Move {
        from: Pointer,
        path: Pointer,
    },
    Copy {
        from: Pointer,
        path: Pointer,
    },
}

impl DiffOperation {
    fn into_operation(self) -> PatchOperation {
        match self {
            Self::Add { path, value } => PatchOperation::Add { path, value },
            Self::Remove {
                path,
                old_value,
                context,
            } => PatchOperation::Remove {
                path,
                original_value: old_value,
                context,
            },
            Self::Replace {
                path,
                old_value,
                value,
            } => PatchOperation::Replace {
                path,
                original_value: old_value,
                value,
            },
            Self::Move { from, path } => PatchOperation::Move { from, path },
            Self::Copy { from, path } => PatchOperation::Copy { from, path },
        }
    }
}

/// The default processor.
///
/// Removes and replaces are recorded as they arrive. An addition is
/// recorded as, in order of preference:
/// 1. a `move`, if an earlier remove displaced an equivalent value (that
///    remove is dropped and the move appended),
/// 2. a `copy`, if an equivalent value sits unchanged in both documents,
/// 3. a plain `add`.
#[derive(Debug)]
pub struct FactoringProcessor<'a> {
    unchanged: UnchangedIndex<'a>,
    diffs: Vec<DiffOperation>,
}

impl<'a> FactoringProcessor<'a> {
    pub fn new(unchanged: UnchangedIndex<'a>) -> Self {
        Self {
            unchanged,
            diffs: Vec::new(),
        }
    }

    /// Index and path of the earliest remove that displaced `value`.
    fn find_previously_removed(&self, value: &Value) -> Option<(usize, Pointer)> {
        self.diffs.iter().enumerate().find_map(|(index, op)| match op {
            DiffOperation::Remove {
                path, old_value, ..
            } if equivalent(value, old_value) => Some((index, path.clone())),
            _ => None,
        })
    }
}

impl PatchProcessor for FactoringProcessor<'_> {
    fn value_added(&mut self, path: Pointer, value: &Value, _context: EventContext<'_>) {
        if let Some((index, from)) = self.find_previously_removed(value) {
            self.diffs.remove(index);
            self.diffs.push(DiffOperation::Move { from, path });
            return;
        }

        let op = match self.unchanged.find_equivalent(value) {
            Some(from) => DiffOperation::Copy {
                from: from.clone(),
                path,
            },
            None => DiffOperation::Add {
                path,
                value: value.clone(),
            },
        };
        self.diffs.push(op);
    }

    fn value_removed(&mut self, path: Pointer, old_value: &Value, context: EventContext<'_>) {
        self.diffs.push(DiffOperation::Remove {
            path,
            old_value: old_value.clone(),
            context: context.into_value(),
        });
    }

    fn value_replaced(
        &mut self,
        path: Pointer,
        old_value: &Value,
        new_value: &Value,
        _context: EventContext<'_>,
    ) {
        self.diffs.push(DiffOperation::Replace {
            path,
            old_value: old_value.clone(),
            value: new_value.clone(),
        });
    }

    fn into_patch(self) -> Patch {
        self.diffs
            .into_iter()
            .map(DiffOperation::into_operation)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// RecordingProcessor
// ---------------------------------------------------------------------------

/// A raw event, as reported by the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum DiffEvent {
    Added {
        path: Pointer,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
    Removed {
        path: Pointer,
        old_value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
    Replaced {
        path: Pointer,
        old_value: Value,
        new_value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
}

impl DiffEvent {
    /// The reported location.
    pub fn path(&self) -> &Pointer {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Replaced { path, .. } => {
                path
            }
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

/// Keeps every event verbatim, without factoring.
#[derive(Clone, Debug, Default)]
pub struct RecordingProcessor {
    events: Vec<DiffEvent>,
}

impl RecordingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> &[DiffEvent] {
        &self.events
    }

    /// Consume the processor, returning its events.
    pub fn into_events(self) -> Vec<DiffEvent> {
        self.events
    }
}

impl PatchProcessor for RecordingProcessor {
    fn value_added(&mut self, path: Pointer, value: &Value, context: EventContext<'_>) {
        self.events.push(DiffEvent::Added {
            path,
            value: value.clone(),
            context: context.into_value(),
        });
    }

    fn value_removed(&mut self, path: Pointer, old_value: &Value, context: EventContext<'_>) {
        self.events.push(DiffEvent::Removed {
            path,
            old_value: old_value.clone(),
            context: context.into_value(),
        });
    }

    fn value_replaced(
        &mut self,
        path: Pointer,
        old_value: &Value,
        new_value: &Value,
        context: EventContext<'_>,
    ) {
        self.events.push(DiffEvent::Replaced {
            path,
            old_value: old_value.clone(),
            new_value: new_value.clone(),
            context: context.into_value(),
        });
    }

    /// The naive edit script: one operation per event.
    fn into_patch(self) -> Patch {
        self.events
            .into_iter()
            .map(|event| match event {
                DiffEvent::Added { path, value, .. } => PatchOperation::Add { path, value },
                DiffEvent::Removed {
                    path,
                    old_value,
                    context,
                } => PatchOperation::Remove {
                    path,
                    original_value: old_value,
                    context,
                },
                DiffEvent::Replaced {
                    path,
                    old_value,
                    new_value,
                    ..
                } => PatchOperation::Replace {
                    path,
                    original_value: old_value,
                    value: new_value,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unchanged::unchanged_values;
    use serde_json::json;

    fn ptr(s: &str) -> Pointer {
        Pointer::parse(s).unwrap()
    }

    #[test]
    fn add_without_match_is_add() {
        let (s, t) = (json!({}), json!({}));
        let mut p = FactoringProcessor::new(unchanged_values(&s, &t).unwrap());
        p.value_added(ptr("/-"), &json!(4), EventContext::None);
        let patch = p.into_patch();
        assert_eq!(
            patch.operations(),
            [PatchOperation::Add {
                path: ptr("/-"),
                value: json!(4)
            }]
        );
    }

    #[test]
    fn add_after_equivalent_remove_becomes_move() {
        let (s, t) = (json!([0]), json!([1]));
        let mut p = FactoringProcessor::new(unchanged_values(&s, &t).unwrap());
        p.value_removed(ptr("/?"), &json!({"k": 1}), EventContext::None);
        p.value_replaced(ptr("/0"), &json!(0), &json!(1), EventContext::None);
        p.value_added(ptr("/x"), &json!({"k": 1.0}), EventContext::None);
        let ops = p.into_patch().into_operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].op_name(), "replace");
        assert_eq!(
            ops[1],
            PatchOperation::Move {
                from: ptr("/?"),
                path: ptr("/x")
            }
        );
    }

    #[test]
    fn earliest_matching_remove_is_consumed() {
        let (s, t) = (json!(null), json!(0));
        let mut p = FactoringProcessor::new(unchanged_values(&s, &t).unwrap());
        p.value_removed(ptr("/a/?"), &json!(1), EventContext::None);
        p.value_removed(ptr("/b/?"), &json!(1), EventContext::None);
        p.value_added(ptr("/c"), &json!(1), EventContext::None);
        let ops = p.into_patch().into_operations();
        assert_eq!(ops[0].path(), &ptr("/b/?"));
        assert_eq!(ops[1].from(), Some(&ptr("/a/?")));
    }

    #[test]
    fn add_of_unchanged_value_becomes_copy() {
        let s = json!({"a": "same", "b": 1});
        let t = json!({"a": "same", "b": 2});
        let mut p = FactoringProcessor::new(unchanged_values(&s, &t).unwrap());
        p.value_added(ptr("/-"), &json!("same"), EventContext::None);
        assert_eq!(
            p.into_patch().operations(),
            [PatchOperation::Copy {
                from: ptr("/a"),
                path: ptr("/-")
            }]
        );
    }

    #[test]
    fn remove_keeps_attribute_context() {
        let (s, t) = (json!(1), json!(2));
        let mut p = FactoringProcessor::new(unchanged_values(&s, &t).unwrap());
        p.value_removed(
            ptr("/Entitlements/?"),
            &json!("test"),
            EventContext::Attributes(vec![json!("100"), Value::Null]),
        );
        match &p.into_patch().operations()[0] {
            PatchOperation::Remove { context, .. } => {
                assert_eq!(context, &Some(json!(["100", null])));
            }
            other => panic!("expected Remove, got {other:?}"),
        }
    }

    #[test]
    fn recording_processor_keeps_events_in_order() {
        let container = json!({"a": 1});
        let mut p = RecordingProcessor::new();
        p.value_removed(ptr("/?"), &json!(1), EventContext::None);
        p.value_added(ptr("/-"), &json!(1), EventContext::Container(&container));
        assert_eq!(p.events().len(), 2);
        assert!(p.events()[0].is_removed());
        assert!(p.events()[1].is_added());

        // No factoring: the pair stays a remove and an add.
        let patch = p.into_patch();
        assert_eq!(patch.count("remove"), 1);
        assert_eq!(patch.count("add"), 1);
    }

    #[test]
    fn event_wire_form() {
        let event = DiffEvent::Replaced {
            path: ptr("/b"),
            old_value: json!(2),
            new_value: json!(3),
            context: None,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "replaced", "path": "/b", "old_value": 2, "new_value": 3})
        );
    }
}
