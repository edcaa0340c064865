//! Regional terminology constants
//!
//! The comparison is scoped to value sets published by the Australian
//! national terminology authority and expanded against SNOMED CT-AU.

/// Canonical URL prefixes of value sets maintained by the national
/// terminology authority (NCTS) and its partner publishers.
pub const NCTS_PREFIXES: &[&str] = &[
    "http://healthterminologies.gov.au",
    "https://healthterminologies.gov.au",
    "https://ranzcr.com",
    "https://www.rcpa.edu.au",
    "http://www.abs.gov.au",
];

/// SNOMED CT base code system URI.
pub const SNOMED_BASE_SYSTEM: &str = "http://snomed.info/sct";

/// SNOMED CT-AU edition URI (module 32506021000036107).
pub const SNOMED_AU_SYSTEM: &str = "http://snomed.info/sct/32506021000036107";

/// Expansion parameter reporting which code system release the server applied.
pub const USED_CODESYSTEM_PARAMETER: &str = "used-codesystem";

/// Check if a value set canonical URL belongs to the regional authority.
pub fn is_ncts_value_set(url: &str) -> bool {
    NCTS_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// Check if a code system URI (possibly carrying a `|version` suffix)
/// identifies the regional SNOMED CT edition.
pub fn is_regional_system_reference(uri: &str) -> bool {
    uri.contains(SNOMED_AU_SYSTEM)
}
