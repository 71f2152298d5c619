//! Externally supplied attendance summaries.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One worker's attendance for one day, as recorded by the clock-in system.
///
/// The payroll timeline merges these in for display; they never affect
/// totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// The day the summary covers.
    pub date: NaiveDate,
    /// First clock-in of the day.
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    /// Last clock-out of the day.
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    /// Total hours on site.
    #[serde(default)]
    pub total_hours: Option<Decimal>,
}
