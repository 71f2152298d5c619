//! Payroll period reconciliation.
//!
//! This module resolves canonical bi-monthly pay periods, derives hour-based
//! amounts from the base salary, aggregates payroll events into totals and a
//! per-day timeline, and issues upsert / mark-paid requests to a
//! [`PayPeriodStore`].

mod aggregator;
mod period_resolver;
mod rates;
mod service;
mod store;

pub use aggregator::{
    BatchOutcome, PayrollInput, aggregate_batch, aggregate_payroll, recalculate_period,
};
pub use period_resolver::{
    LATE_PERIOD_END_DAY, LATE_PERIOD_START_DAY, MID_PERIOD_END_DAY, MID_PERIOD_START_DAY,
    is_canonical_pay_period, next_pay_period, previous_pay_period, resolve_pay_period,
};
pub use rates::{hour_based_amount, hour_multiplier, hourly_rate, round_money};
pub use service::{PayrollService, PeriodCalculation};
pub use store::{InMemoryPayPeriodStore, PayPeriodStore};
