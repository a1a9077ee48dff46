//! Time handling for item spans and collection temporal extents.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StacError, StacResult};

/// A closed time span `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Span of one listing year: January 1st to December 31st, both at midnight UTC.
    ///
    /// Published GeoCubes items carry exactly these bounds, so the end is
    /// not pushed to the last second of the year.
    pub fn calendar_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(0, 0, 0)?;
        Some(Self {
            start: Utc.from_utc_datetime(&start),
            end: Utc.from_utc_datetime(&end),
        })
    }

    /// Year span for a year-partitioned listing URL such as
    /// `https://host/geocubes/dem/2020/`.
    ///
    /// Returns `None` when the last path segment is not a four-digit year.
    pub fn from_year_path(url: &str) -> Option<Self> {
        let segment = url.trim_end_matches('/').rsplit('/').next()?;
        if segment.len() != 4 || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::calendar_year(segment.parse().ok()?)
    }
}

/// Parse an ISO 8601 timestamp the way catalog servers emit them.
pub fn parse_datetime(s: &str) -> StacResult<DateTime<Utc>> {
    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(StacError::InvalidTime(s.to_string()))
}
