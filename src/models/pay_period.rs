//! Pay period model and its status lifecycle.
//!
//! This module contains the [`PayPeriod`] aggregate, keyed by worker and exact
//! date range, and the forward-only [`PayPeriodStatus`] state machine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PayrollEvent, PayrollTotals, TimeRange};
use crate::error::{EngineError, EngineResult};

/// Lifecycle of a pay period.
///
/// Status only moves forward: `OPEN -> CALCULATED -> PAID`. A calculated
/// period may be recalculated any number of times; `PAID` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayPeriodStatus {
    /// Created, never aggregated.
    Open,
    /// Totals have been derived from the current event set.
    Calculated,
    /// Confirmed as paid. Terminal.
    Paid,
}

impl PayPeriodStatus {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// # Example
    ///
    /// ```
    /// use workshop_engine::models::PayPeriodStatus;
    ///
    /// assert!(PayPeriodStatus::Open.can_transition_to(PayPeriodStatus::Calculated));
    /// assert!(PayPeriodStatus::Calculated.can_transition_to(PayPeriodStatus::Calculated));
    /// assert!(PayPeriodStatus::Calculated.can_transition_to(PayPeriodStatus::Paid));
    /// assert!(!PayPeriodStatus::Paid.can_transition_to(PayPeriodStatus::Calculated));
    /// ```
    pub fn can_transition_to(self, next: PayPeriodStatus) -> bool {
        matches!(
            (self, next),
            (PayPeriodStatus::Open, PayPeriodStatus::Calculated)
                | (PayPeriodStatus::Calculated, PayPeriodStatus::Calculated)
                | (PayPeriodStatus::Calculated, PayPeriodStatus::Paid)
        )
    }

    /// The wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            PayPeriodStatus::Open => "OPEN",
            PayPeriodStatus::Calculated => "CALCULATED",
            PayPeriodStatus::Paid => "PAID",
        }
    }
}

impl std::fmt::Display for PayPeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The idempotent upsert key of a pay period: one per worker and exact range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriodKey {
    /// The worker the period belongs to.
    pub user_id: String,
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl PayPeriodKey {
    /// Builds the key for a worker and range.
    pub fn new(user_id: impl Into<String>, range: &TimeRange) -> Self {
        Self {
            user_id: user_id.into(),
            start: range.start,
            end: range.end,
        }
    }

    /// The error raised when this period is paid and cannot change.
    pub fn locked_error(&self) -> EngineError {
        EngineError::PeriodLocked {
            user_id: self.user_id.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

/// A worker's pay period with its events, derived totals and status.
///
/// # Example
///
/// ```
/// use workshop_engine::models::{PayPeriod, PayPeriodStatus, TimeRange};
/// use rust_decimal::Decimal;
///
/// let range = TimeRange::parse("2024-03-06", "2024-03-20").unwrap();
/// let period = PayPeriod::open("worker_1", range, Decimal::from(50000));
/// assert_eq!(period.status, PayPeriodStatus::Open);
/// assert!(period.contains_date(range.start));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The worker the period belongs to.
    pub user_id: String,
    /// The canonical date range of the period.
    pub range: TimeRange,
    /// The worker's base salary for one period.
    pub base_salary: Decimal,
    /// Events falling inside the range.
    #[serde(default)]
    pub events: Vec<PayrollEvent>,
    /// Lifecycle status.
    pub status: PayPeriodStatus,
    /// Totals from the last aggregation run, if any.
    #[serde(default)]
    pub totals: Option<PayrollTotals>,
    /// When the period was confirmed as paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl PayPeriod {
    /// A fresh period with no events and no totals.
    pub fn open(user_id: impl Into<String>, range: TimeRange, base_salary: Decimal) -> Self {
        Self {
            user_id: user_id.into(),
            range,
            base_salary,
            events: Vec::new(),
            status: PayPeriodStatus::Open,
            totals: None,
            paid_at: None,
        }
    }

    /// The upsert key of this period.
    pub fn key(&self) -> PayPeriodKey {
        PayPeriodKey::new(self.user_id.clone(), &self.range)
    }

    /// Checks if a given date falls within this pay period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
    }

    /// True once the period has been confirmed as paid.
    pub fn is_locked(&self) -> bool {
        self.status == PayPeriodStatus::Paid
    }

    /// Moves the period to `next`, rejecting backwards or skipped moves.
    ///
    /// Any attempt to leave `PAID` yields [`EngineError::PeriodLocked`].
    pub fn advance(&mut self, next: PayPeriodStatus) -> EngineResult<()> {
        if self.is_locked() {
            return Err(self.key().locked_error());
        }
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Confirms the period as paid, stamping `paid_at`.
    pub fn mark_paid(&mut self, paid_at: DateTime<Utc>) -> EngineResult<()> {
        self.advance(PayPeriodStatus::Paid)?;
        self.paid_at = Some(paid_at);
        Ok(())
    }
}
