//! Core data models for the workshop engine.
//!
//! This module contains the domain models shared by calendar layout and
//! payroll reconciliation.

mod attendance;
mod pay_period;
mod payroll_event;
mod payroll_result;
mod scheduled_item;
mod time_range;

pub use attendance::AttendanceSummary;
pub use pay_period::{PayPeriod, PayPeriodKey, PayPeriodStatus};
pub use payroll_event::{EventEffect, PayrollEvent, PayrollEventKind, PayrollEventRecord};
pub use payroll_result::{
    AuditStep, AuditTrace, AuditWarning, PayrollLine, PayrollSummary, PayrollTotals,
    TimelineDay,
};
pub use scheduled_item::ScheduledItem;
pub use time_range::{TimeRange, WeekWindow, parse_date};
