//! Candidate release planning
//!
//! SNOMED CT-AU is published monthly; each release is named after the last
//! day of its month.

use chrono::{Datelike, Duration, NaiveDate};
use vsdiff_models::ReleaseId;

/// Releases dated more than this many days after today are treated as not
/// yet published.
pub const RELEASE_SAFETY_MARGIN_DAYS: i64 = 7;

/// The `months_back` most recent completed months before `today`, newest first.
///
/// Starting from the first day of the current month, each step takes the
/// last day of the preceding month: `plan_releases(3, 2024-03-15)` yields
/// `20240229, 20240131, 20231231`.
pub fn plan_releases(months_back: i32, today: NaiveDate) -> Vec<ReleaseId> {
    if months_back <= 0 {
        return Vec::new();
    }

    let (mut year, mut month) = (today.year(), today.month());
    let mut releases = Vec::with_capacity(months_back as usize);
    for _ in 0..months_back {
        (year, month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        if let Some(release) = ReleaseId::month_ending(year, month) {
            releases.push(release);
        }
    }
    releases
}

/// Drop releases later than `cutoff` or later than `today` plus the safety
/// margin. Order is preserved.
pub fn filter_releases(
    releases: &[ReleaseId],
    today: NaiveDate,
    cutoff: Option<NaiveDate>,
) -> Vec<ReleaseId> {
    let horizon = today + Duration::days(RELEASE_SAFETY_MARGIN_DAYS);
    let limit = cutoff.map_or(horizon, |cutoff| cutoff.min(horizon));

    releases
        .iter()
        .copied()
        .filter(|release| {
            let keep = release.date() <= limit;
            if !keep {
                tracing::info!(release = %release, limit = %limit, "Dropping release after cutoff");
            }
            keep
        })
        .collect()
}
