//! The recursive diff generator.
//!
//! Walks source and target in lock-step and reports each divergence to a
//! [`PatchProcessor`]:
//!
//! 1. equivalent values produce nothing;
//! 2. values of different kinds, or unequal scalars, produce one `replaced`
//!    event at the current pointer and the walk does not descend;
//! 3. two objects go through the object step, two arrays through the array
//!    step.
//!
//! # Reporting paths
//!
//! Removals and additions are not reported at the literal location of the
//! element. They use sentinel tokens appended to the *parent* of the
//! current container pointer:
//!
//! - a removed object field or array element is reported at `parent/?`;
//! - an added object field is reported at `parent/-`;
//! - an appended array element is reported at the array pointer itself.
//!
//! Audit consumers group changes per record with these paths, so they must
//! stay as they are.

use recdiff_types::Pointer;
use serde_json::{Map, Value};

use crate::config::DiffConfig;
use crate::equivalence::equivalent;
use crate::error::{DiffError, DiffResult};
use crate::processor::{EventContext, PatchProcessor};
use crate::unchanged::check_depth;

const REMOVED_TOKEN: &str = "?";
const ADDED_TOKEN: &str = "-";

/// Drives one diff invocation into a processor.
pub struct Generator<'c, P> {
    processor: P,
    config: &'c DiffConfig,
    emitted: usize,
}

impl<'c, P: PatchProcessor> Generator<'c, P> {
    pub fn new(processor: P, config: &'c DiffConfig) -> Self {
        Self {
            processor,
            config,
            emitted: 0,
        }
    }

    /// Diff `source` against `target` from the root and hand back the
    /// processor.
    pub fn run(mut self, source: &Value, target: &Value) -> DiffResult<P> {
        self.diff(&Pointer::root(), source, target, source, 0)?;
        Ok(self.processor)
    }

    fn diff(
        &mut self,
        pointer: &Pointer,
        source: &Value,
        target: &Value,
        container: &Value,
        depth: usize,
    ) -> DiffResult<()> {
        if equivalent(source, target) {
            return Ok(());
        }

        match (source, target) {
            (Value::Object(s), Value::Object(t)) => {
                self.diff_objects(pointer, (source, s), (target, t), depth)
            }
            (Value::Array(s), Value::Array(t)) => self.diff_arrays(pointer, source, s, t, depth),
            _ => {
                self.count_event()?;
                self.processor.value_replaced(
                    pointer.clone(),
                    source,
                    target,
                    EventContext::Container(container),
                );
                Ok(())
            }
        }
    }

    /// Removed fields, then added fields, then recursion into shared
    /// fields; each group in lexicographic key order.
    fn diff_objects(
        &mut self,
        pointer: &Pointer,
        (source_value, source): (&Value, &Map<String, Value>),
        (target_value, target): (&Value, &Map<String, Value>),
        depth: usize,
    ) -> DiffResult<()> {
        let only_in = |a: &Map<String, Value>, b: &Map<String, Value>| -> Vec<String> {
            a.keys().filter(|k| !b.contains_key(*k)).cloned().collect()
        };
        let mut removed = only_in(source, target);
        let mut added = only_in(target, source);
        let mut shared: Vec<&String> = source.keys().filter(|k| target.contains_key(*k)).collect();
        removed.sort();
        added.sort();
        shared.sort();

        for field in &removed {
            self.count_event()?;
            let context = EventContext::Attributes(self.identity(target_value));
            self.processor.value_removed(
                pointer.parent().append(REMOVED_TOKEN),
                &source[field],
                context,
            );
        }

        for field in &added {
            self.count_event()?;
            self.processor.value_added(
                pointer.parent().append(ADDED_TOKEN),
                &target[field],
                EventContext::Container(source_value),
            );
        }

        for field in shared {
            let child = pointer.append(field);
            check_depth(&child, depth + 1, self.config.max_depth)?;
            self.diff(&child, &source[field], &target[field], source_value, depth + 1)?;
        }

        Ok(())
    }

    /// Tail removals, then element-wise recursion over the common prefix,
    /// then tail additions. Elements are never realigned by content.
    fn diff_arrays(
        &mut self,
        pointer: &Pointer,
        source_value: &Value,
        source: &[Value],
        target: &[Value],
        depth: usize,
    ) -> DiffResult<()> {
        let common = source.len().min(target.len());

        for element in &source[common..] {
            self.count_event()?;
            let context = EventContext::Attributes(self.identity(element));
            self.processor
                .value_removed(pointer.parent().append(REMOVED_TOKEN), element, context);
        }

        for (index, (s, t)) in source.iter().zip(target.iter()).enumerate() {
            let child = pointer.append(index);
            check_depth(&child, depth + 1, self.config.max_depth)?;
            self.diff(&child, s, t, source_value, depth + 1)?;
        }

        for element in &target[common..] {
            self.count_event()?;
            self.processor
                .value_added(pointer.clone(), element, EventContext::None);
        }

        Ok(())
    }

    /// The configured identity attributes of `record`, `null` where absent.
    fn identity(&self, record: &Value) -> Vec<Value> {
        self.config
            .identity_attributes
            .iter()
            .map(|attr| record.get(attr).cloned().unwrap_or(Value::Null))
            .collect()
    }

    fn count_event(&mut self) -> DiffResult<()> {
        if self.emitted >= self.config.max_events {
            return Err(DiffError::TooManyEvents {
                limit: self.config.max_events,
            });
        }
        self.emitted += 1;
        Ok(())
    }
}
