use std::collections::BTreeSet;

use recdiff_types::Pointer;
use serde_json::Value;

use crate::check::{kind_name, CheckDecision, GuardCheck, Violation};
use crate::error::GuardError;

/// Attribute presence check.
///
/// Resolves `pointer` in the document and requires an array whose every
/// element is an object carrying all `required` keys. Fails closed: a
/// missing pointer or a non-array value is a violation, and an element that
/// is not an object is missing every attribute.
pub struct AttributePresenceCheck {
    name: String,
    pointer: Pointer,
    required: BTreeSet<String>,
}

impl AttributePresenceCheck {
    pub fn new(pointer: Pointer, required: BTreeSet<String>) -> Self {
        Self {
            name: format!("attribute-presence:{pointer}"),
            pointer,
            required,
        }
    }

    fn missing_in(&self, element: &Value) -> Vec<String> {
        let object = element.as_object();
        self.required
            .iter()
            .filter(|attr| !object.is_some_and(|o| o.contains_key(attr.as_str())))
            .cloned()
            .collect()
    }
}

impl GuardCheck for AttributePresenceCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, document: &Value) -> Result<CheckDecision, GuardError> {
        let Some(target) = self.pointer.resolve(document) else {
            return Ok(CheckDecision::Fail(Violation::MissingArray {
                pointer: self.pointer.clone(),
            }));
        };

        let Value::Array(elements) = target else {
            return Ok(CheckDecision::Fail(Violation::NotAnArray {
                pointer: self.pointer.clone(),
                found: kind_name(target),
            }));
        };

        for (index, element) in elements.iter().enumerate() {
            let missing = self.missing_in(element);
            if !missing.is_empty() {
                return Ok(CheckDecision::Fail(Violation::MissingAttributes {
                    pointer: self.pointer.clone(),
                    index,
                    missing,
                }));
            }
        }

        Ok(CheckDecision::Pass)
    }
}
