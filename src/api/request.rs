//! Request types for the workshop engine API.
//!
//! Dates arrive as strings and are parsed with [`parse_date`], so both
//! `YYYY-MM-DD` and timestamps are accepted and normalized to calendar days.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSummary, PayPeriodKey, PayrollEvent, PayrollEventRecord, ScheduledItem, TimeRange,
    parse_date,
};

/// Request body for `POST /calendar/layout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRequest {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Missions to lay out, in upstream order.
    #[serde(default)]
    pub items: Vec<ScheduledItemRequest>,
}

/// A mission in a layout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledItemRequest {
    /// Mission identifier.
    pub id: String,
    /// First day, `YYYY-MM-DD` or a timestamp.
    pub start: String,
    /// Last day, `YYYY-MM-DD` or a timestamp.
    pub end: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Assigned worker ids.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Opaque display data.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TryFrom<ScheduledItemRequest> for ScheduledItem {
    type Error = EngineError;

    fn try_from(req: ScheduledItemRequest) -> EngineResult<Self> {
        Ok(ScheduledItem {
            range: TimeRange::parse(&req.start, &req.end)?,
            id: req.id,
            title: req.title,
            participants: req.participants,
            payload: req.payload,
        })
    }
}

/// Query string for `GET /payroll/period`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// The reference date.
    pub today: String,
}

/// Request body for `POST /payroll/calculate`.
///
/// Either `today` (resolved to its canonical period) or both `start` and
/// `end` must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// The worker being paid.
    pub user_id: String,
    /// The worker's current base salary for one period.
    pub base_salary: Decimal,
    /// Reference date used to resolve the period.
    #[serde(default)]
    pub today: Option<String>,
    /// Explicit period start.
    #[serde(default)]
    pub start: Option<String>,
    /// Explicit period end.
    #[serde(default)]
    pub end: Option<String>,
    /// Stored payroll events.
    #[serde(default)]
    pub events: Vec<PayrollEventRecord>,
    /// Optional attendance summaries.
    #[serde(default)]
    pub attendance: Vec<AttendanceSummary>,
}

/// Where a payroll request wants its period from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelector {
    /// Resolve the canonical period containing this date.
    Today(chrono::NaiveDate),
    /// Use this exact range.
    Explicit(TimeRange),
}

impl PayrollRequest {
    /// Parses the period selection.
    pub fn period(&self) -> EngineResult<PeriodSelector> {
        match (&self.start, &self.end, &self.today) {
            (Some(start), Some(end), _) => {
                Ok(PeriodSelector::Explicit(TimeRange::parse(start, end)?))
            }
            (None, None, Some(today)) => Ok(PeriodSelector::Today(parse_date(today)?)),
            _ => Err(EngineError::InvalidDate {
                value: "either 'today' or both 'start' and 'end' are required".to_string(),
            }),
        }
    }

    /// Converts the stored records into typed events.
    pub fn typed_events(&self) -> EngineResult<Vec<PayrollEvent>> {
        self.events
            .iter()
            .cloned()
            .map(PayrollEvent::try_from)
            .collect()
    }
}

/// Request body for `POST /payroll/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    /// The worker the period belongs to.
    pub user_id: String,
    /// Period start.
    pub start: String,
    /// Period end.
    pub end: String,
}

impl TryFrom<ConfirmRequest> for PayPeriodKey {
    type Error = EngineError;

    fn try_from(req: ConfirmRequest) -> EngineResult<Self> {
        let range = TimeRange::parse(&req.start, &req.end)?;
        Ok(PayPeriodKey::new(req.user_id, &range))
    }
}
