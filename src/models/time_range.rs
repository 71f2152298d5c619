//! Date ranges and Monday-aligned week windows.
//!
//! [`TimeRange`] is a closed, day-granular interval. Construction rejects
//! `end < start`, so every range that reaches layout or aggregation is valid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A closed date interval, inclusive on both ends.
///
/// # Example
///
/// ```
/// use workshop_engine::models::TimeRange;
///
/// let a = TimeRange::parse("2024-03-04", "2024-03-06").unwrap();
/// let b = TimeRange::parse("2024-03-06", "2024-03-08").unwrap();
/// assert!(a.overlaps(&b));
/// assert_eq!(a.clip(&b), Some(TimeRange::parse("2024-03-06", "2024-03-06").unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: String,
    end: String,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = EngineError;

    fn try_from(raw: RawTimeRange) -> EngineResult<Self> {
        TimeRange::parse(&raw.start, &raw.end)
    }
}

impl TimeRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Parses both ends with [`parse_date`] and validates the result.
    pub fn parse(start: &str, end: &str) -> EngineResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// True iff the two closed ranges share at least one day.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The intersection with `window`, or `None` when the ranges are disjoint.
    pub fn clip(&self, window: &TimeRange) -> Option<TimeRange> {
        if !self.overlaps(window) {
            return None;
        }
        Some(TimeRange {
            start: self.start.max(window.start),
            end: self.end.min(window.end),
        })
    }

    /// Checks if a date falls within the range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates every day of the range in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parses a date string and normalizes it to a calendar day.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS` (or with a space
/// separator), and RFC 3339 timestamps. Any time-of-day component is dropped;
/// offset timestamps keep the calendar day of their own local offset.
///
/// # Example
///
/// ```
/// use workshop_engine::models::parse_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(parse_date("2024-03-05").unwrap(), expected);
/// assert_eq!(parse_date("2024-03-05T23:30:00").unwrap(), expected);
/// assert_eq!(parse_date("2024-03-05T23:30:00-05:00").unwrap(), expected);
/// ```
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local().date());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }
    Err(EngineError::InvalidDate {
        value: value.to_string(),
    })
}

/// A Monday-aligned window of exactly seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    range: TimeRange,
}

impl WeekWindow {
    /// The window containing `date`, starting on the Monday on or before it.
    pub fn containing(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            range: TimeRange {
                start: monday,
                end: monday + Duration::days(6),
            },
        }
    }

    /// The window as a plain range.
    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    /// The Monday opening the window.
    pub fn start(&self) -> NaiveDate {
        self.range.start
    }

    /// The Sunday closing the window.
    pub fn end(&self) -> NaiveDate {
        self.range.end
    }

    /// The window immediately after this one.
    pub fn next(&self) -> Self {
        Self::containing(self.range.end + Duration::days(1))
    }

    /// ISO weekday column of a date, Monday = 1 through Sunday = 7.
    pub fn column_of(date: NaiveDate) -> u32 {
        date.weekday().number_from_monday()
    }
}
