//! Hourly rate derivation and money rounding.
//!
//! ## Rate Structure
//!
//! - Hourly rate: `base_salary / working_days_per_period / paid_hours_per_day`
//! - Overtime: hourly rate x overtime multiplier (1.5) x hours
//! - Tardiness and early departure: hourly rate x deduction multiplier (1) x hours
//!
//! The hourly rate is kept at full precision; only the final amount of each
//! event is rounded, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::PayrollEventKind;

fn overflow(subject: impl Into<String>) -> EngineError {
    EngineError::AmountOverflow {
        subject: subject.into(),
    }
}

/// `a * b`, failing with `AmountOverflow` instead of panicking.
pub(crate) fn checked_mul(a: Decimal, b: Decimal, subject: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(subject))
}

/// `a + b`, failing with `AmountOverflow` instead of panicking.
pub(crate) fn checked_add(a: Decimal, b: Decimal, subject: &str) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(subject))
}

/// `a - b`, failing with `AmountOverflow` instead of panicking.
pub(crate) fn checked_sub(a: Decimal, b: Decimal, subject: &str) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(subject))
}

/// Rounds a money amount to the policy precision, half away from zero.
///
/// # Example
///
/// ```
/// use workshop_engine::config::PayrollPolicy;
/// use workshop_engine::payroll::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let policy = PayrollPolicy::default();
/// assert_eq!(round_money(Decimal::from_str("1.005").unwrap(), &policy), Decimal::from_str("1.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-1.005").unwrap(), &policy), Decimal::from_str("-1.01").unwrap());
/// ```
pub fn round_money(amount: Decimal, policy: &PayrollPolicy) -> Decimal {
    amount.round_dp_with_strategy(policy.decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// The unrounded hourly rate for a per-period base salary.
///
/// # Example
///
/// ```
/// use workshop_engine::config::PayrollPolicy;
/// use workshop_engine::payroll::hourly_rate;
/// use rust_decimal::Decimal;
///
/// let rate = hourly_rate(Decimal::from(50000), &PayrollPolicy::default()).unwrap();
/// assert_eq!(rate.round_dp(2), Decimal::new(55556, 2));
/// ```
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] when the policy has zero working
/// days or zero paid hours.
pub fn hourly_rate(base_salary: Decimal, policy: &PayrollPolicy) -> EngineResult<Decimal> {
    policy.validate()?;
    base_salary
        .checked_div(Decimal::from(policy.working_days_per_period))
        .and_then(|per_day| per_day.checked_div(Decimal::from(policy.paid_hours_per_day)))
        .ok_or_else(|| overflow("hourly rate"))
}

/// The multiplier applied to the hourly rate for an hour-based kind.
///
/// Returns `None` for kinds whose amount is never derived from hours.
pub fn hour_multiplier(kind: PayrollEventKind, policy: &PayrollPolicy) -> Option<Decimal> {
    match kind {
        PayrollEventKind::Overtime => Some(policy.overtime_multiplier),
        PayrollEventKind::Tardiness | PayrollEventKind::EarlyDeparture => {
            Some(policy.hourly_deduction_multiplier)
        }
        _ => None,
    }
}

/// The rounded amount for `hours` of an hour-based kind.
///
/// Returns `Ok(None)` for kinds that are not hour-based, and
/// [`EngineError::AmountOverflow`] when the product does not fit a decimal.
pub fn hour_based_amount(
    kind: PayrollEventKind,
    hours: Decimal,
    rate: Decimal,
    policy: &PayrollPolicy,
) -> EngineResult<Option<Decimal>> {
    let Some(multiplier) = hour_multiplier(kind, policy) else {
        return Ok(None);
    };
    let subject = format!("{} of {} hours", kind, hours);
    let per_hour = checked_mul(rate, multiplier, &subject)?;
    let amount = checked_mul(per_hour, hours, &subject)?;
    Ok(Some(round_money(amount, policy)))
}
