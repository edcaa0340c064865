//! `$expand` request building and response interpretation

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use vsdiff_models::{
    ExpansionResponse, ReleaseId, ValueSetDefinition, SNOMED_AU_SYSTEM, SNOMED_BASE_SYSTEM,
};

/// Capability to count a value set's expansion against one release.
///
/// Implemented by [`TerminologyClient`](crate::TerminologyClient); tests
/// substitute stubs.
#[async_trait]
pub trait ValueSetExpander: Send + Sync {
    /// Expand `value_set_url` against `release`.
    ///
    /// `definition` is the locally indexed ValueSet, when known. It enables
    /// the release mismatch check for value sets drawing on SNOMED CT-AU.
    async fn expand(
        &self,
        value_set_url: &str,
        release: ReleaseId,
        definition: Option<&ValueSetDefinition>,
    ) -> ExpansionResult;
}

/// Member count and display title from one expansion.
///
/// `count == None` means the expansion is unusable for this release;
/// `issue` then says why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionResult {
    pub count: Option<u64>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<ExpansionIssue>,
}

impl ExpansionResult {
    pub fn counted(count: u64, title: Option<String>) -> Self {
        Self {
            count: Some(count),
            title,
            issue: None,
        }
    }

    pub fn unusable(issue: ExpansionIssue) -> Self {
        Self {
            count: None,
            title: None,
            issue: Some(issue),
        }
    }
}

/// Why an expansion produced no count.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExpansionIssue {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("server responded with status {status}")]
    HttpStatus { status: u16 },

    #[error("invalid JSON response: {message}")]
    InvalidJson { message: String },

    #[error("requested release {requested} but server used {used}")]
    ReleaseMismatch { requested: ReleaseId, used: String },

    #[error("unexpected expansion format")]
    UnexpectedFormat,
}

/// Build the `$expand` URL asking only for the total, pinned to a SNOMED CT-AU release.
pub fn expand_url(endpoint: &str, value_set_url: &str, release: ReleaseId) -> String {
    format!(
        "{}/ValueSet/$expand?url={}&system-version={}%7C{}/version/{}&count=0&offset=0",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(value_set_url),
        urlencoding::encode(SNOMED_BASE_SYSTEM),
        urlencoding::encode(SNOMED_AU_SYSTEM),
        release
    )
}

/// Interpret a successful `$expand` response body.
///
/// Title comes from `title`, else `name`. For value sets whose definition
/// draws on SNOMED CT-AU, a `used-codesystem` parameter naming a different
/// release discards the result. The count is `expansion.total`, else the
/// length of `expansion.contains`.
pub fn interpret_expansion(
    payload: &Value,
    release: ReleaseId,
    definition: Option<&ValueSetDefinition>,
) -> ExpansionResult {
    let Ok(response) = ExpansionResponse::from_value(payload) else {
        return ExpansionResult::unusable(ExpansionIssue::UnexpectedFormat);
    };
    let title = response.display_title().map(str::to_string);

    let Some(expansion) = response.expansion.as_ref() else {
        return ExpansionResult {
            count: None,
            title,
            issue: Some(ExpansionIssue::UnexpectedFormat),
        };
    };

    if definition.is_some_and(ValueSetDefinition::contains_regional_code_system) {
        if let Some(used) = expansion.used_regional_release() {
            if !used.contains(&release.to_string()) {
                return ExpansionResult::unusable(ExpansionIssue::ReleaseMismatch {
                    requested: release,
                    used: used.to_string(),
                });
            }
        }
    }

    match expansion.count() {
        Some(count) => ExpansionResult::counted(count, title),
        None => ExpansionResult {
            count: None,
            title,
            issue: Some(ExpansionIssue::UnexpectedFormat),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn release(id: &str) -> ReleaseId {
        id.parse().unwrap()
    }

    fn snomed_au_definition() -> ValueSetDefinition {
        ValueSetDefinition::from_resource(&json!({
            "resourceType": "ValueSet",
            "url": "https://healthterminologies.gov.au/fhir/ValueSet/body-site-1",
            "name": "BodySite",
            "compose": { "include": [{ "system": "http://snomed.info/sct/32506021000036107" }] }
        }))
        .unwrap()
    }

    fn with_used_release(used: &str) -> Value {
        json!({
            "title": "Body Site",
            "expansion": {
                "total": 31016,
                "parameter": [{
                    "name": "used-codesystem",
                    "valueUri": format!("http://snomed.info/sct|http://snomed.info/sct/32506021000036107/version/{used}")
                }]
            }
        })
    }

    #[test]
    fn test_expand_url() {
        let url = expand_url(
            "https://tx.ontoserver.csiro.au/fhir/",
            "https://healthterminologies.gov.au/fhir/ValueSet/body-site-1",
            release("20240131"),
        );
        assert_eq!(
            url,
            "https://tx.ontoserver.csiro.au/fhir/ValueSet/$expand\
             ?url=https%3A%2F%2Fhealthterminologies.gov.au%2Ffhir%2FValueSet%2Fbody-site-1\
             &system-version=http%3A%2F%2Fsnomed.info%2Fsct%7Chttp%3A%2F%2Fsnomed.info%2Fsct%2F32506021000036107/version/20240131\
             &count=0&offset=0"
        );
    }

    #[test]
    fn test_total_int_is_used() {
        let result = interpret_expansion(&json!({"expansion": {"total": 42}}), release("20240131"), None);
        assert_eq!(result, ExpansionResult::counted(42, None));
    }

    #[test]
    fn test_total_string_is_parsed() {
        let result = interpret_expansion(&json!({"expansion": {"total": "7"}}), release("20240131"), None);
        assert_eq!(result.count, Some(7));
        assert!(result.issue.is_none());
    }

    #[test]
    fn test_contains_list_is_counted() {
        let result = interpret_expansion(
            &json!({"expansion": {"contains": [{"code": "a"}, {"code": "b"}]}}),
            release("20240131"),
            None,
        );
        assert_eq!(result.count, Some(2));
    }

    #[test]
    fn test_unexpected_expansion_returns_none() {
        let result = interpret_expansion(
            &json!({"title": "Odd", "expansion": {"contains": "not-a-list"}}),
            release("20240131"),
            None,
        );
        assert_eq!(result.count, None);
        assert_eq!(result.title.as_deref(), Some("Odd"));
        assert_eq!(result.issue, Some(ExpansionIssue::UnexpectedFormat));

        let result = interpret_expansion(&json!({"name": "NoExpansion"}), release("20240131"), None);
        assert_eq!(result.count, None);
        assert_eq!(result.title.as_deref(), Some("NoExpansion"));

        let result = interpret_expansion(&json!([1, 2]), release("20240131"), None);
        assert_eq!(result.issue, Some(ExpansionIssue::UnexpectedFormat));
    }

    #[test]
    fn test_release_mismatch_discards_result() {
        let definition = snomed_au_definition();
        let result = interpret_expansion(
            &with_used_release("20231231"),
            release("20240131"),
            Some(&definition),
        );

        assert_eq!(result.count, None);
        assert_eq!(result.title, None);
        match result.issue {
            Some(ExpansionIssue::ReleaseMismatch { requested, used }) => {
                assert_eq!(requested, release("20240131"));
                assert!(used.ends_with("/version/20231231"));
            }
            other => panic!("expected release mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_release_is_counted() {
        let definition = snomed_au_definition();
        let result = interpret_expansion(
            &with_used_release("20240131"),
            release("20240131"),
            Some(&definition),
        );
        assert_eq!(result, ExpansionResult::counted(31016, Some("Body Site".into())));
    }

    #[test]
    fn test_mismatch_check_skipped_without_regional_content() {
        let payload = with_used_release("20231231");

        let result = interpret_expansion(&payload, release("20240131"), None);
        assert_eq!(result.count, Some(31016));

        let unrelated = ValueSetDefinition::from_resource(&json!({
            "resourceType": "ValueSet",
            "url": "https://healthterminologies.gov.au/fhir/ValueSet/loinc-subset-1",
            "compose": { "include": [{ "system": "http://loinc.org" }] }
        }))
        .unwrap();
        let result = interpret_expansion(&payload, release("20240131"), Some(&unrelated));
        assert_eq!(result.count, Some(31016));
    }

    #[test]
    fn test_issue_messages_name_both_releases() {
        let issue = ExpansionIssue::ReleaseMismatch {
            requested: release("20240131"),
            used: "http://snomed.info/sct|http://snomed.info/sct/32506021000036107/version/20231231".into(),
        };
        let message = issue.to_string();
        assert!(message.contains("20240131"));
        assert!(message.contains("20231231"));
    }
}
