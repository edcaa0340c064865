//! Flagging release-over-release drops in expansion size

use crate::rows::Row;
use serde::Serialize;
use std::collections::BTreeMap;
use vsdiff_models::ReleaseId;

const THRESHOLD_SCALE: f64 = 0.5118;
const THRESHOLD_EXPONENT: f64 = 0.6257;

/// Outcome of comparing two expansion counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Significance {
    pub is_significant: bool,
    /// Smallest absolute change that counts as significant for `old`
    pub threshold: f64,
}

/// Whether the change from `old` to `new` exceeds noise.
///
/// The threshold grows sub-linearly with the base count: about 25 at 500,
/// about 500 at 60,000.
pub fn significance(old: u64, new: u64) -> Significance {
    let threshold = THRESHOLD_SCALE * (old as f64).powf(THRESHOLD_EXPONENT);
    let change = old.abs_diff(new) as f64;
    Significance {
        is_significant: change >= threshold,
        threshold,
    }
}

/// Flag each release whose count dropped significantly from the release
/// after it in `releases`.
///
/// `releases` is newest first; position decides which of a pair is newer.
/// Every listed release gets an entry. Pairs with a missing count on either
/// side are skipped.
pub fn classify_row(row: &Row, releases: &[ReleaseId]) -> BTreeMap<ReleaseId, bool> {
    let mut flags: BTreeMap<ReleaseId, bool> =
        releases.iter().map(|release| (*release, false)).collect();

    for pair in releases.windows(2) {
        let (newer, older) = (pair[0], pair[1]);
        let (Some(new), Some(old)) = (row.count(&newer), row.count(&older)) else {
            continue;
        };
        if new < old && significance(old, new).is_significant {
            tracing::debug!(
                value_set = %row.value_set_url,
                release = %newer,
                old,
                new,
                "Significant drop in expansion size"
            );
            flags.insert(newer, true);
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(id: &str) -> ReleaseId {
        id.parse().unwrap()
    }

    fn row(counts: &[(&str, Option<u64>)]) -> Row {
        Row {
            value_set_url: "https://healthterminologies.gov.au/fhir/ValueSet/body-site-1".into(),
            value_set_name: "Body Site".into(),
            ncts: true,
            snomed_au: true,
            structure_definitions: Vec::new(),
            counts: counts.iter().map(|(id, count)| (release(id), *count)).collect(),
        }
    }

    #[test]
    fn test_threshold_at_five_hundred() {
        let result = significance(500, 475);
        assert!((result.threshold - 25.0).abs() < 0.05);
        assert!(result.is_significant);
        assert!(!significance(500, 476).is_significant);
    }

    #[test]
    fn test_threshold_at_sixty_thousand() {
        let result = significance(60000, 59500);
        assert!((result.threshold - 500.0).abs() < 0.5);
        assert!(result.is_significant);
        assert!(!significance(60000, 59501).is_significant);
    }

    #[test]
    fn test_growth_is_symmetric_in_magnitude() {
        assert!(significance(500, 525).is_significant);
        assert!(!significance(500, 500).is_significant);
    }

    #[test]
    fn test_zero_base_any_change_is_significant() {
        let result = significance(0, 3);
        assert_eq!(result.threshold, 0.0);
        assert!(result.is_significant);
    }

    #[test]
    fn test_drop_flags_newer_release() {
        let releases = [release("20250630"), release("20250531")];
        let flags = classify_row(
            &row(&[("20250630", Some(353)), ("20250531", Some(508))]),
            &releases,
        );
        assert!(flags[&release("20250630")]);
        assert!(!flags[&release("20250531")]);
    }

    #[test]
    fn test_list_position_decides_newer() {
        let releases = [release("20250531"), release("20250630")];
        let flags = classify_row(
            &row(&[("20250531", Some(353)), ("20250630", Some(508))]),
            &releases,
        );
        assert!(flags[&release("20250531")]);
        assert!(!flags[&release("20250630")]);
    }

    #[test]
    fn test_increase_and_small_drop_not_flagged() {
        let releases = [release("20250630"), release("20250531"), release("20250430")];
        let flags = classify_row(
            &row(&[
                ("20250630", Some(900)),
                ("20250531", Some(490)),
                ("20250430", Some(500)),
            ]),
            &releases,
        );
        assert!(flags.values().all(|flagged| !flagged));
    }

    #[test]
    fn test_missing_counts_skip_pairs() {
        let releases = [release("20250630"), release("20250531"), release("20250430")];
        let flags = classify_row(
            &row(&[
                ("20250630", Some(10)),
                ("20250531", None),
                ("20250430", Some(60000)),
            ]),
            &releases,
        );
        assert_eq!(flags.len(), 3);
        assert!(flags.values().all(|flagged| !flagged));
    }
}
