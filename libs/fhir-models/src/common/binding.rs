//! Terminology bindings discovered in StructureDefinitions

use serde::{Deserialize, Serialize};

/// A value set bound by an element of a StructureDefinition.
///
/// `value_set_url` is always non-empty and trimmed. The structure fields may
/// be empty when the defining StructureDefinition has no `url`/`name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub value_set_url: String,
    pub structure_url: String,
    pub structure_name: String,
}

impl Binding {
    /// Create a binding, returning `None` when the value set reference is
    /// blank after trimming.
    pub fn new(
        value_set_url: &str,
        structure_url: impl Into<String>,
        structure_name: impl Into<String>,
    ) -> Option<Self> {
        let value_set_url = value_set_url.trim();
        if value_set_url.is_empty() {
            return None;
        }
        Some(Self {
            value_set_url: value_set_url.to_string(),
            structure_url: structure_url.into(),
            structure_name: structure_name.into(),
        })
    }

    /// Identity used to deduplicate bindings repeated across snapshot and
    /// differential, or across packages.
    pub fn identity(&self) -> (&str, &str) {
        (&self.value_set_url, &self.structure_url)
    }
}
