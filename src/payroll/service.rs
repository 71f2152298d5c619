//! Pay period workflow over a [`PayPeriodStore`].
//!
//! Resolves the canonical period, refuses to touch paid periods, aggregates
//! from the full current event set and upserts the result.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::aggregator::{PayrollInput, aggregate_payroll};
use super::period_resolver::resolve_pay_period;
use super::store::PayPeriodStore;
use crate::config::PayrollPolicy;
use crate::error::EngineResult;
use crate::models::{
    AttendanceSummary, PayPeriod, PayPeriodKey, PayPeriodStatus, PayrollEvent, PayrollSummary,
    TimeRange,
};

/// A calculated period together with the run that produced it.
#[derive(Debug, Clone)]
pub struct PeriodCalculation {
    /// The period as stored after the run.
    pub period: PayPeriod,
    /// The full aggregation output.
    pub summary: PayrollSummary,
}

/// Ties period resolution, aggregation and persistence together.
#[derive(Debug, Clone)]
pub struct PayrollService<S> {
    store: S,
    policy: PayrollPolicy,
}

impl<S: PayPeriodStore> PayrollService<S> {
    /// Creates a service over `store` using `policy`.
    pub fn new(store: S, policy: PayrollPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    /// Calculates the pay period containing `today` and stores it.
    pub fn calculate_current(
        &self,
        user_id: &str,
        base_salary: Decimal,
        events: &[PayrollEvent],
        attendance: Vec<AttendanceSummary>,
        today: NaiveDate,
    ) -> EngineResult<PeriodCalculation> {
        let range = resolve_pay_period(today)?;
        self.calculate_for(user_id, range, base_salary, events, attendance)
    }

    /// Calculates an explicit period range and stores it.
    ///
    /// Only events for `user_id` dated inside `range` are kept on the stored
    /// period. Fails with `PeriodLocked` if the stored period is paid.
    pub fn calculate_for(
        &self,
        user_id: &str,
        range: TimeRange,
        base_salary: Decimal,
        events: &[PayrollEvent],
        attendance: Vec<AttendanceSummary>,
    ) -> EngineResult<PeriodCalculation> {
        let key = PayPeriodKey::new(user_id, &range);
        let mut period = match self.store.get(&key)? {
            Some(existing) if existing.is_locked() => return Err(key.locked_error()),
            Some(existing) => existing,
            None => PayPeriod::open(user_id, range, base_salary),
        };

        period.base_salary = base_salary;
        period.events = events
            .iter()
            .filter(|e| e.user_id == user_id && range.contains(e.date))
            .cloned()
            .collect();

        let summary = aggregate_payroll(&PayrollInput::from_period(&period, attendance), &self.policy)?;
        period.advance(PayPeriodStatus::Calculated)?;
        period.totals = Some(summary.totals.clone());

        let period = self.store.upsert(period)?;
        debug!(
            user_id,
            period = %range,
            final_amount = %summary.totals.final_amount,
            "Stored calculated pay period"
        );
        Ok(PeriodCalculation { period, summary })
    }

    /// Confirms a calculated period as paid.
    pub fn confirm_paid(&self, key: &PayPeriodKey, paid_at: DateTime<Utc>) -> EngineResult<PayPeriod> {
        self.store.mark_paid(key, paid_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::PayrollEventKind;
    use crate::payroll::InMemoryPayPeriodStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> PayrollService<InMemoryPayPeriodStore> {
        PayrollService::new(InMemoryPayPeriodStore::new(), PayrollPolicy::default())
    }

    fn bonus(id: &str, user: &str, amount: &str, day: &str) -> PayrollEvent {
        PayrollEvent::new(id, user, PayrollEventKind::Bonus, dec(amount), date(day), "").unwrap()
    }

    #[test]
    fn test_calculate_current_resolves_and_stores_period() {
        let svc = service();
        let events = vec![
            bonus("e1", "w1", "100", "2024-03-10"),
            bonus("e2", "w1", "999", "2024-03-25"),
            bonus("e3", "w2", "999", "2024-03-10"),
        ];
        let result = svc
            .calculate_current("w1", dec("1000"), &events, vec![], date("2024-03-12"))
            .unwrap();

        assert_eq!(result.period.range, TimeRange::parse("2024-03-06", "2024-03-20").unwrap());
        assert_eq!(result.period.status, PayPeriodStatus::Calculated);
        assert_eq!(result.period.events.len(), 1);
        assert_eq!(result.summary.totals.final_amount, dec("1100"));

        let stored = svc.store().get(&result.period.key()).unwrap().unwrap();
        assert_eq!(stored, result.period);
    }

    #[test]
    fn test_recalculation_is_a_full_replace() {
        let svc = service();
        let first = vec![bonus("e1", "w1", "100", "2024-03-10")];
        svc.calculate_current("w1", dec("1000"), &first, vec![], date("2024-03-12"))
            .unwrap();
        let again = svc
            .calculate_current("w1", dec("1000"), &first, vec![], date("2024-03-15"))
            .unwrap();
        assert_eq!(again.summary.totals.final_amount, dec("1100"));
        assert_eq!(svc.store().len().unwrap(), 1);
    }

    #[test]
    fn test_recompute_after_paid_is_locked_and_totals_unchanged() {
        let svc = service();
        let events = vec![bonus("e1", "w1", "100", "2024-03-10")];
        let calc = svc
            .calculate_current("w1", dec("1000"), &events, vec![], date("2024-03-12"))
            .unwrap();
        let key = calc.period.key();
        svc.confirm_paid(&key, Utc::now()).unwrap();

        let more = vec![
            bonus("e1", "w1", "100", "2024-03-10"),
            bonus("e2", "w1", "500", "2024-03-11"),
        ];
        let result = svc.calculate_current("w1", dec("1000"), &more, vec![], date("2024-03-12"));
        assert!(matches!(result, Err(EngineError::PeriodLocked { .. })));

        let stored = svc.store().get(&key).unwrap().unwrap();
        assert_eq!(stored.status, PayPeriodStatus::Paid);
        assert_eq!(stored.totals.unwrap().final_amount, dec("1100"));
    }

    #[test]
    fn test_confirm_paid_twice_is_rejected() {
        let svc = service();
        let calc = svc
            .calculate_current("w1", dec("1000"), &[], vec![], date("2024-03-02"))
            .unwrap();
        let key = calc.period.key();
        let paid = svc.confirm_paid(&key, Utc::now()).unwrap();
        assert!(paid.paid_at.is_some());
        assert!(matches!(
            svc.confirm_paid(&key, Utc::now()),
            Err(EngineError::PeriodLocked { .. })
        ));
    }
}
