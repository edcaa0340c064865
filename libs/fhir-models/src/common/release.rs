//! Regional code system release identifiers

use super::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A monthly code system release, identified by the last calendar day of its
/// month and written as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseId(NaiveDate);

impl ReleaseId {
    /// Release for the given month.
    pub fn month_ending(year: i32, month: u32) -> Option<Self> {
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1)?, 1)
        } else {
            (year, month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?
            .pred_opt()
            .map(Self)
    }

    /// Release for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::month_ending(date.year(), date.month())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

/// Parse an 8-digit `YYYYMMDD` token into a date.
pub fn parse_compact_date(value: &str) -> Result<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidRelease(format!(
            "'{}' is not an 8-digit YYYYMMDD value",
            value
        )));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|e| Error::InvalidRelease(format!("'{}': {}", value, e)))
}

impl FromStr for ReleaseId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let date = parse_compact_date(value)?;
        let release = Self::containing(date)
            .ok_or_else(|| Error::InvalidRelease(format!("'{}' is out of range", value)))?;
        if release.0 != date {
            return Err(Error::InvalidRelease(format!(
                "'{}' is not the last day of its month",
                value
            )));
        }
        Ok(release)
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl Serialize for ReleaseId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
