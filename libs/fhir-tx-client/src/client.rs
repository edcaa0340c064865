//! Terminology server HTTP client

use crate::error::{Error, Result};
use crate::expansion::{
    expand_url, interpret_expansion, ExpansionIssue, ExpansionResult, ValueSetExpander,
};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use vsdiff_models::{ReleaseId, ValueSetDefinition};

/// Server-side expansion can take a while for large SNOMED CT value sets.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

const FHIR_JSON: &str = "application/fhir+json";

/// Client for a FHIR terminology server's `ValueSet/$expand` operation.
///
/// Requests are never retried; a failure degrades the one expansion it
/// belongs to.
#[derive(Debug, Clone)]
pub struct TerminologyClient {
    client: Client,
    endpoint: String,
}

impl TerminologyClient {
    /// Create a client with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::InvalidEndpoint(endpoint));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: trimmed.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(
        &self,
        value_set_url: &str,
        release: ReleaseId,
        definition: Option<&ValueSetDefinition>,
    ) -> ExpansionResult {
        let url = expand_url(&self.endpoint, value_set_url, release);
        tracing::debug!(url = %url, "Expanding value set");

        let response = match self.client.get(&url).header(ACCEPT, FHIR_JSON).send().await {
            Ok(response) => response,
            Err(e) => {
                return ExpansionResult::unusable(ExpansionIssue::Transport {
                    message: e.to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ExpansionResult::unusable(ExpansionIssue::HttpStatus {
                status: status.as_u16(),
            });
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                return ExpansionResult::unusable(ExpansionIssue::InvalidJson {
                    message: e.to_string(),
                })
            }
        };

        interpret_expansion(&payload, release, definition)
    }
}

#[async_trait]
impl ValueSetExpander for TerminologyClient {
    async fn expand(
        &self,
        value_set_url: &str,
        release: ReleaseId,
        definition: Option<&ValueSetDefinition>,
    ) -> ExpansionResult {
        let result = self.fetch(value_set_url, release, definition).await;

        match &result.issue {
            Some(issue) => tracing::warn!(
                value_set = %value_set_url,
                release = %release,
                "Expansion unusable: {}",
                issue
            ),
            None => tracing::debug!(
                value_set = %value_set_url,
                release = %release,
                count = ?result.count,
                "Expansion counted"
            ),
        }

        result
    }
}
