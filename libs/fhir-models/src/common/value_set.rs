//! FHIR ValueSet lite model
//!
//! Version-agnostic model for the parts of a ValueSet definition used when
//! deciding how to compare its expansions.

use super::element_definition::string_field;
use super::error::{Error, Result};
use super::terminology::{SNOMED_AU_SYSTEM, SNOMED_BASE_SYSTEM};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FHIR ValueSet definition found in a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetDefinition {
    /// Canonical identifier
    pub url: String,

    /// Name (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// `compose.include` entries, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compose_includes: Vec<ComposeInclude>,
}

/// Include codes from a code system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeInclude {
    /// The system the codes come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Specific version of the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ValueSetDefinition {
    /// Read a ValueSet definition from a JSON resource.
    ///
    /// Requires `resourceType: "ValueSet"` and a string `url`. Includes that
    /// are not objects are skipped.
    pub fn from_resource(resource: &Value) -> Result<Self> {
        let object = resource
            .as_object()
            .ok_or_else(|| Error::InvalidResource("resource is not a JSON object".into()))?;

        let resource_type = object
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if resource_type != "ValueSet" {
            return Err(Error::UnexpectedResourceType {
                expected: "ValueSet".into(),
                found: resource_type.to_string(),
            });
        }

        let url = string_field(object.get("url"))
            .ok_or_else(|| Error::InvalidResource("ValueSet without a string url".into()))?;

        let compose_includes = object
            .get("compose")
            .and_then(|compose| compose.get("include"))
            .and_then(Value::as_array)
            .map(|includes| {
                includes
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|include| ComposeInclude {
                        system: string_field(include.get("system")),
                        version: string_field(include.get("version")),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            url,
            name: string_field(object.get("name")),
            title: string_field(object.get("title")),
            compose_includes,
        })
    }

    /// `name`, falling back to `title`; empty strings count as absent.
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.title.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
    }

    /// True if any include draws from the regional SNOMED CT edition, either
    /// directly by system URI or through the base SNOMED system pinned to a
    /// regional version.
    ///
    /// Only value sets for which this holds are checked for release mismatches
    /// when expanded.
    pub fn contains_regional_code_system(&self) -> bool {
        self.compose_includes.iter().any(|include| {
            let Some(system) = include.system.as_deref() else {
                return false;
            };
            if system.starts_with(SNOMED_AU_SYSTEM) {
                return true;
            }
            system == SNOMED_BASE_SYSTEM
                && include
                    .version
                    .as_deref()
                    .is_some_and(|version| version.contains(SNOMED_AU_SYSTEM))
        })
    }
}
