//! ValueSet `$expand` response lite model

use super::element_definition::string_field;
use super::error::{Error, Result};
use super::terminology::{is_regional_system_reference, USED_CODESYSTEM_PARAMETER};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The subset of an expanded ValueSet returned by `$expand`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<ValueSetExpansion>,
}

/// Expansion block of the value set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansion {
    /// Total number of codes, from an integer or a digit-only string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Length of `contains`, when it is a list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_len: Option<usize>,

    /// Parameters the server reports having used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<ExpansionParameter>,
}

/// Name/value pair from `expansion.parameter`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
}

impl ExpansionResponse {
    /// Read an `$expand` response body. Fails only when the body is not a JSON object.
    pub fn from_value(payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| Error::InvalidResource("expansion response is not a JSON object".into()))?;

        Ok(Self {
            title: string_field(object.get("title")),
            name: string_field(object.get("name")),
            expansion: object
                .get("expansion")
                .and_then(Value::as_object)
                .map(|expansion| ValueSetExpansion {
                    total: expansion.get("total").and_then(parse_total),
                    contains_len: expansion
                        .get("contains")
                        .and_then(Value::as_array)
                        .map(Vec::len),
                    parameter: expansion
                        .get("parameter")
                        .and_then(Value::as_array)
                        .map(|params| {
                            params
                                .iter()
                                .filter_map(Value::as_object)
                                .map(|param| ExpansionParameter {
                                    name: string_field(param.get("name")),
                                    value_uri: string_field(param.get("valueUri")),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                }),
        })
    }

    /// `title`, falling back to `name`; empty strings count as absent.
    pub fn display_title(&self) -> Option<&str> {
        [self.title.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
    }
}

impl ValueSetExpansion {
    /// `total` when present, otherwise the length of `contains`.
    pub fn count(&self) -> Option<u64> {
        self.total
            .or_else(|| self.contains_len.and_then(|len| u64::try_from(len).ok()))
    }

    /// The regional code system release the server reports having used, if any.
    pub fn used_regional_release(&self) -> Option<&str> {
        self.parameter
            .iter()
            .filter(|param| param.name.as_deref() == Some(USED_CODESYSTEM_PARAMETER))
            .filter_map(|param| param.value_uri.as_deref())
            .find(|uri| is_regional_system_reference(uri))
    }
}

/// Accepts a non-negative JSON integer or a digit-only string; any other shape is absent.
fn parse_total(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                text.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}
