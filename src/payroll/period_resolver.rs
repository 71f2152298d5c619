//! Canonical bi-monthly pay period boundaries.
//!
//! Periods run from the 6th to the 20th, and from the 21st to the 5th of the
//! following month. The resolved range is the idempotency key for pay period
//! upserts, so it must depend on nothing but the date.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::TimeRange;

/// First day of the mid-month period.
pub const MID_PERIOD_START_DAY: u32 = 6;
/// Last day of the mid-month period.
pub const MID_PERIOD_END_DAY: u32 = 20;
/// First day of the month-straddling period.
pub const LATE_PERIOD_START_DAY: u32 = 21;
/// Last day of the month-straddling period, in the following month.
pub const LATE_PERIOD_END_DAY: u32 = 5;

/// Maps a date to the canonical pay period containing it.
///
/// - day <= 5  -> 21st of the previous month through the 5th
/// - day <= 20 -> 6th through 20th of the current month
/// - otherwise -> 21st through the 5th of the next month
///
/// # Example
///
/// ```
/// use workshop_engine::payroll::resolve_pay_period;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
/// let period = resolve_pay_period(today).unwrap();
/// assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 2, 21).unwrap());
/// assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
/// ```
pub fn resolve_pay_period(today: NaiveDate) -> EngineResult<TimeRange> {
    let (year, month) = (today.year(), today.month());
    let (start, end) = if today.day() <= LATE_PERIOD_END_DAY {
        let (py, pm) = previous_month(year, month);
        (
            ymd(py, pm, LATE_PERIOD_START_DAY)?,
            ymd(year, month, LATE_PERIOD_END_DAY)?,
        )
    } else if today.day() <= MID_PERIOD_END_DAY {
        (
            ymd(year, month, MID_PERIOD_START_DAY)?,
            ymd(year, month, MID_PERIOD_END_DAY)?,
        )
    } else {
        let (ny, nm) = next_month(year, month);
        (
            ymd(year, month, LATE_PERIOD_START_DAY)?,
            ymd(ny, nm, LATE_PERIOD_END_DAY)?,
        )
    };
    TimeRange::new(start, end)
}

/// The period immediately after `period`.
pub fn next_pay_period(period: &TimeRange) -> EngineResult<TimeRange> {
    resolve_pay_period(period.end + Duration::days(1))
}

/// The period immediately before `period`.
pub fn previous_pay_period(period: &TimeRange) -> EngineResult<TimeRange> {
    resolve_pay_period(period.start - Duration::days(1))
}

/// True when `range` is exactly one canonical pay period.
pub fn is_canonical_pay_period(range: &TimeRange) -> bool {
    matches!(resolve_pay_period(range.start), Ok(resolved) if resolved == *range)
}

fn ymd(year: i32, month: u32, day: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(EngineError::InvalidMonth { year, month })
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
