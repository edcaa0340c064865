//! FHIR StructureDefinition lite model

use super::binding::Binding;
use super::element_definition::{string_field, ElementDefinition};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FHIR StructureDefinition, reduced to its identity and element lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Canonical identifier (empty if absent)
    pub url: String,

    /// Name (computer friendly, empty if absent)
    pub name: String,

    /// Snapshot view of the structure
    pub snapshot: Vec<ElementDefinition>,

    /// Differential view of the structure
    pub differential: Vec<ElementDefinition>,
}

impl StructureDefinition {
    /// Read a StructureDefinition from a JSON resource.
    ///
    /// Fails only when the value is not an object or is not a
    /// StructureDefinition. A missing or malformed `snapshot`/`differential`
    /// yields an empty element list.
    pub fn from_resource(resource: &Value) -> Result<Self> {
        let object = resource
            .as_object()
            .ok_or_else(|| Error::InvalidResource("resource is not a JSON object".into()))?;

        let resource_type = object
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if resource_type != "StructureDefinition" {
            return Err(Error::UnexpectedResourceType {
                expected: "StructureDefinition".into(),
                found: resource_type.to_string(),
            });
        }

        Ok(Self {
            url: string_field(object.get("url")).unwrap_or_default(),
            name: string_field(object.get("name")).unwrap_or_default(),
            snapshot: elements_of(object.get("snapshot")),
            differential: elements_of(object.get("differential")),
        })
    }

    /// Snapshot elements followed by differential elements.
    pub fn all_elements(&self) -> impl Iterator<Item = &ElementDefinition> {
        self.snapshot.iter().chain(self.differential.iter())
    }

    /// One binding per element carrying a string `valueSet`, in element order.
    ///
    /// Bindings repeated across snapshot and differential are returned twice;
    /// deduplication happens downstream by [`Binding::identity`].
    pub fn bindings(&self) -> Vec<Binding> {
        self.all_elements()
            .filter_map(ElementDefinition::bound_value_set)
            .filter_map(|value_set| Binding::new(value_set, self.url.clone(), self.name.clone()))
            .collect()
    }
}

fn elements_of(section: Option<&Value>) -> Vec<ElementDefinition> {
    section
        .and_then(|section| section.get("element"))
        .and_then(Value::as_array)
        .map(|elements| {
            elements
                .iter()
                .filter_map(ElementDefinition::from_value)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VS: &str = "https://healthterminologies.gov.au/fhir/ValueSet/australian-states-territories-2";

    fn make_sd(snapshot: Value, differential: Value) -> Value {
        json!({
            "resourceType": "StructureDefinition",
            "url": "http://hl7.org.au/fhir/StructureDefinition/au-address",
            "name": "AustralianAddress",
            "snapshot": snapshot,
            "differential": differential
        })
    }

    #[test]
    fn test_bindings_from_both_sections() {
        let element = json!({
            "path": "Address.state",
            "binding": { "strength": "extensible", "valueSet": VS }
        });
        let sd = StructureDefinition::from_resource(&make_sd(
            json!({ "element": [element.clone()] }),
            json!({ "element": [element] }),
        ))
        .unwrap();

        let bindings = sd.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0], bindings[1]);
        assert_eq!(bindings[0].structure_name, "AustralianAddress");
        assert_eq!(
            bindings[0].structure_url,
            "http://hl7.org.au/fhir/StructureDefinition/au-address"
        );
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let sd = StructureDefinition::from_resource(&json!({
            "resourceType": "StructureDefinition",
            "url": "http://example.org/sd"
        }))
        .unwrap();

        assert!(sd.snapshot.is_empty());
        assert!(sd.differential.is_empty());
        assert!(sd.name.is_empty());
        assert!(sd.bindings().is_empty());
    }

    #[test]
    fn test_malformed_sections_are_empty() {
        let sd = StructureDefinition::from_resource(&make_sd(
            json!({ "element": "not-a-list" }),
            json!(["not", "an", "object"]),
        ))
        .unwrap();

        assert!(sd.bindings().is_empty());
    }

    #[test]
    fn test_blank_value_set_skipped() {
        let sd = StructureDefinition::from_resource(&make_sd(
            json!({ "element": [
                { "path": "Address.state", "binding": { "valueSet": "   " } },
                { "path": "Address.country", "binding": { "valueSet": format!(" {VS} ") } }
            ]}),
            Value::Null,
        ))
        .unwrap();

        let bindings = sd.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].value_set_url, VS);
    }

    #[test]
    fn test_wrong_resource_type_rejected() {
        let err = StructureDefinition::from_resource(&json!({
            "resourceType": "ValueSet",
            "url": VS
        }))
        .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResourceType { .. }));

        assert!(StructureDefinition::from_resource(&json!([1, 2, 3])).is_err());
    }
}
