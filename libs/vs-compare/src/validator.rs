//! Narrowing candidate releases to those the terminology server can expand

use vsdiff_models::{is_ncts_value_set, ReleaseId, ValueSetDefinition};
use vsdiff_package::ValueSetIndex;
use vsdiff_tx_client::ValueSetExpander;

/// Pick the value set used to probe release availability.
///
/// Prefers NCTS value sets drawing on SNOMED CT-AU, so a server silently
/// substituting another release is detected; falls back to any NCTS value
/// set. Ties break on the smallest URL so the choice does not depend on
/// directory scan order.
pub fn select_probe(index: &ValueSetIndex) -> Option<&ValueSetDefinition> {
    let ncts = || index.iter().filter(|vs| is_ncts_value_set(&vs.url));

    ncts()
        .filter(|vs| vs.contains_regional_code_system())
        .min_by(|a, b| a.url.cmp(&b.url))
        .or_else(|| ncts().min_by(|a, b| a.url.cmp(&b.url)))
}

/// Keep the candidate releases for which the probe value set expands to a
/// count. Without an NCTS value set to probe, candidates are returned
/// unchanged.
///
/// Probes run one at a time, in candidate order.
pub async fn validate_releases(
    expander: &dyn ValueSetExpander,
    index: &ValueSetIndex,
    candidates: &[ReleaseId],
) -> Vec<ReleaseId> {
    let Some(probe) = select_probe(index) else {
        tracing::warn!("No NCTS ValueSet available to validate releases against");
        return candidates.to_vec();
    };
    tracing::info!(value_set = %probe.url, "Validating releases");

    let mut available = Vec::with_capacity(candidates.len());
    for &release in candidates {
        let result = expander.expand(&probe.url, release, Some(probe)).await;
        if result.count.is_some() {
            available.push(release);
        } else {
            tracing::warn!(release = %release, "Release not available on terminology server");
        }
    }
    available
}
