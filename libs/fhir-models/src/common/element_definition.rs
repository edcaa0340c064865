//! FHIR ElementDefinition lite model
//!
//! Only the identity and terminology binding of an element are kept.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An element from a StructureDefinition snapshot or differential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.gender")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,
}

/// Binding of an element to a value set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,

    /// Source of value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
}

impl ElementDefinition {
    /// Read an element from JSON. Returns `None` when the value is not an object.
    ///
    /// A `binding` that is not an object, or a `valueSet` that is not a
    /// string, is ignored rather than rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let binding = object
            .get("binding")
            .and_then(Value::as_object)
            .map(|binding| ElementDefinitionBinding {
                strength: string_field(binding.get("strength")),
                value_set: string_field(binding.get("valueSet")),
            });

        Some(Self {
            id: string_field(object.get("id")),
            path: string_field(object.get("path")),
            binding,
        })
    }

    /// The bound value set reference, if any.
    pub fn bound_value_set(&self) -> Option<&str> {
        self.binding.as_ref()?.value_set.as_deref()
    }
}

pub(crate) fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
