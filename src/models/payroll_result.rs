//! Payroll aggregation result models.
//!
//! This module contains the [`PayrollSummary`] type and its associated
//! structures that capture all outputs of a pay period aggregation, including
//! resolved lines, the per-day timeline, totals and an audit trace.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceSummary, EventEffect, PayrollEventKind, TimeRange};

/// A payroll event resolved to a concrete magnitude.
///
/// # Example
///
/// ```
/// use workshop_engine::models::{EventEffect, PayrollEventKind, PayrollLine};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let line = PayrollLine {
///     event_id: "evt_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
///     kind: PayrollEventKind::Tardiness,
///     effect: EventEffect::Deduction,
///     hours: Some(Decimal::from(2)),
///     rate: Some(Decimal::from_str("555.5555555555555555555555556").unwrap()),
///     amount: Decimal::from_str("1111.11").unwrap(),
///     description: "Late twice".to_string(),
/// };
/// assert_eq!(line.signed_amount(), Decimal::from_str("-1111.11").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLine {
    /// The event this line came from.
    pub event_id: String,
    /// The day the event applies to.
    pub date: NaiveDate,
    /// The event kind.
    pub kind: PayrollEventKind,
    /// The effect derived from the kind.
    pub effect: EventEffect,
    /// Hours, for lines derived from an hourly rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    /// Rate per hour applied, for lines derived from an hourly rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Non-negative magnitude, rounded to the policy precision.
    pub amount: Decimal,
    /// Free-text note copied from the event.
    #[serde(default)]
    pub description: String,
}

impl PayrollLine {
    /// The amount with the sign implied by its effect; zero for neutral lines.
    pub fn signed_amount(&self) -> Decimal {
        match self.effect {
            EventEffect::Addition => self.amount,
            EventEffect::Deduction => -self.amount,
            EventEffect::Neutral => Decimal::ZERO,
        }
    }
}

/// One calendar day of a pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDay {
    /// The day.
    pub date: NaiveDate,
    /// Lines for events on this day, in input order.
    pub lines: Vec<PayrollLine>,
    /// Attendance for this day, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<AttendanceSummary>,
}

/// Aggregated totals for a pay period.
///
/// `final_amount = base_salary + total_additions - total_deductions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// The base salary for the period.
    pub base_salary: Decimal,
    /// Sum of addition magnitudes.
    pub total_additions: Decimal,
    /// Sum of deduction magnitudes.
    pub total_deductions: Decimal,
    /// The payable amount.
    pub final_amount: Decimal,
    /// Sum of magnitudes per kind, neutral kinds included.
    pub by_kind: BTreeMap<PayrollEventKind, Decimal>,
    /// Number of events counted.
    pub event_count: usize,
    /// Number of neutral events recorded without affecting totals.
    pub informational_count: usize,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during aggregation.
///
/// Warnings flag inputs that were ignored or coerced without failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of aggregating one worker's pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// Unique identifier for this run.
    pub calculation_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The worker the summary is for.
    pub user_id: String,
    /// The pay period range.
    pub range: TimeRange,
    /// Hourly rate derived from the base salary.
    pub hourly_rate: Decimal,
    /// Every counted event, resolved, in input order.
    pub lines: Vec<PayrollLine>,
    /// One entry per calendar day of the range.
    pub timeline: Vec<TimelineDay>,
    /// Aggregated totals.
    pub totals: PayrollTotals,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
