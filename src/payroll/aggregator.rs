//! Pay period aggregation.
//!
//! Groups one worker's payroll events for one period, resolves each to a
//! magnitude, classifies it through [`PayrollEventKind::effect`] and derives
//! the payable amount:
//!
//! `final = base_salary + sum(additions) - sum(deductions)`
//!
//! Every run recomputes the totals from the full event set, so repeating a
//! run over the same input yields identical totals.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::rates::{
    checked_add, checked_mul, checked_sub, hour_based_amount, hour_multiplier, hourly_rate,
    round_money,
};
use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSummary, AuditStep, AuditTrace, AuditWarning, EventEffect, PayPeriod,
    PayPeriodStatus, PayrollEvent, PayrollEventKind, PayrollLine, PayrollSummary, PayrollTotals,
    TimeRange, TimelineDay,
};

/// Everything needed to aggregate one worker's pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    /// The worker being paid.
    pub user_id: String,
    /// The pay period range.
    pub range: TimeRange,
    /// The worker's current base salary for one period.
    pub base_salary: Decimal,
    /// Candidate events; those outside the range or for another worker are ignored.
    #[serde(default)]
    pub events: Vec<PayrollEvent>,
    /// Optional per-day attendance, merged into the timeline.
    #[serde(default)]
    pub attendance: Vec<AttendanceSummary>,
}

impl PayrollInput {
    /// Builds the input for a stored pay period.
    pub fn from_period(period: &PayPeriod, attendance: Vec<AttendanceSummary>) -> Self {
        Self {
            user_id: period.user_id.clone(),
            range: period.range,
            base_salary: period.base_salary,
            events: period.events.clone(),
            attendance,
        }
    }
}

/// The outcome of one worker in a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The worker.
    pub user_id: String,
    /// The summary, or the error that stopped this worker only.
    pub result: EngineResult<PayrollSummary>,
}

/// Aggregates one worker's events over a pay period.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] when the policy would divide by
/// zero, [`EngineError::InvalidAmount`] when the base salary or an event's
/// hours are negative, and [`EngineError::AmountOverflow`] when a sum no
/// longer fits a decimal. Legacy events with negative stored amounts are accepted and counted by
/// magnitude, with an audit warning.
///
/// # Example
///
/// ```
/// use workshop_engine::config::PayrollPolicy;
/// use workshop_engine::models::{PayrollEvent, PayrollEventKind, TimeRange};
/// use workshop_engine::payroll::{PayrollInput, aggregate_payroll};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
/// let input = PayrollInput {
///     user_id: "w1".to_string(),
///     range: TimeRange::parse("2024-03-06", "2024-03-20").unwrap(),
///     base_salary: Decimal::from(50000),
///     events: vec![
///         PayrollEvent::new("e1", "w1", PayrollEventKind::Bonus, Decimal::from(5000), day, "").unwrap(),
///         PayrollEvent::new("e2", "w1", PayrollEventKind::Absence, Decimal::from(2000), day, "").unwrap(),
///         PayrollEvent::hourly("e3", "w1", PayrollEventKind::Tardiness, Decimal::from(2), day, "").unwrap(),
///     ],
///     attendance: vec![],
/// };
///
/// let summary = aggregate_payroll(&input, &PayrollPolicy::default()).unwrap();
/// assert_eq!(summary.totals.final_amount, Decimal::from_str("51888.89").unwrap());
/// ```
pub fn aggregate_payroll(input: &PayrollInput, policy: &PayrollPolicy) -> EngineResult<PayrollSummary> {
    let started = Instant::now();
    policy.validate()?;

    if input.base_salary.is_sign_negative() && !input.base_salary.is_zero() {
        return Err(EngineError::InvalidAmount {
            subject: format!("base_salary of {}", input.user_id),
            amount: input.base_salary,
        });
    }

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let rate = hourly_rate(input.base_salary, policy)?;
    steps.push(AuditStep {
        step_number,
        rule_id: "hourly_rate".to_string(),
        rule_name: "Hourly Rate Derivation".to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "working_days_per_period": policy.working_days_per_period,
            "paid_hours_per_day": policy.paid_hours_per_day
        }),
        output: serde_json::json!({
            "hourly_rate": round_money(rate, policy).to_string()
        }),
        reasoning: format!(
            "${} / {} days / {} hours = ${} per hour",
            input.base_salary,
            policy.working_days_per_period,
            policy.paid_hours_per_day,
            round_money(rate, policy)
        ),
    });
    step_number += 1;

    let mut lines: Vec<PayrollLine> = Vec::new();
    for event in &input.events {
        if event.user_id != input.user_id {
            warn!(
                event_id = %event.id,
                event_user = %event.user_id,
                user_id = %input.user_id,
                "Ignoring event for another worker"
            );
            warnings.push(AuditWarning {
                code: "FOREIGN_USER_EVENT".to_string(),
                message: format!(
                    "Event '{}' belongs to '{}', not '{}'; ignored",
                    event.id, event.user_id, input.user_id
                ),
                severity: "medium".to_string(),
            });
            continue;
        }
        if !input.range.contains(event.date) {
            warnings.push(AuditWarning {
                code: "EVENT_OUTSIDE_PERIOD".to_string(),
                message: format!(
                    "Event '{}' on {} is outside {}; ignored",
                    event.id, event.date, input.range
                ),
                severity: "low".to_string(),
            });
            continue;
        }

        let line = resolve_line(event, rate, policy, &mut warnings)?;
        steps.push(AuditStep {
            step_number,
            rule_id: "classify_event".to_string(),
            rule_name: "Event Classification".to_string(),
            input: serde_json::json!({
                "event_id": event.id,
                "kind": event.kind,
                "amount": event.amount.to_string(),
                "hours": event.hours.map(|h| h.to_string())
            }),
            output: serde_json::json!({
                "effect": line.effect,
                "amount": line.amount.to_string()
            }),
            reasoning: describe_line(&line),
        });
        step_number += 1;
        lines.push(line);
    }

    let totals = build_totals(input.base_salary, &lines, policy)?;
    steps.push(AuditStep {
        step_number,
        rule_id: "final_amount".to_string(),
        rule_name: "Final Payable Amount".to_string(),
        input: serde_json::json!({
            "base_salary": totals.base_salary.to_string(),
            "total_additions": totals.total_additions.to_string(),
            "total_deductions": totals.total_deductions.to_string()
        }),
        output: serde_json::json!({
            "final_amount": totals.final_amount.to_string()
        }),
        reasoning: format!(
            "${} + ${} - ${} = ${}",
            totals.base_salary, totals.total_additions, totals.total_deductions, totals.final_amount
        ),
    });

    let timeline = build_timeline(&input.range, &lines, &input.attendance);

    debug!(
        user_id = %input.user_id,
        period = %input.range,
        events = lines.len(),
        final_amount = %totals.final_amount,
        "Aggregated pay period"
    );

    Ok(PayrollSummary {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        user_id: input.user_id.clone(),
        range: input.range,
        hourly_rate: round_money(rate, policy),
        lines,
        timeline,
        totals,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: started.elapsed().as_micros() as u64,
        },
    })
}

/// Recomputes a stored period from its current events.
///
/// Totals are replaced, never patched, and the period moves to
/// `CALCULATED`. A paid period is rejected with
/// [`EngineError::PeriodLocked`] and left untouched.
pub fn recalculate_period(
    period: &PayPeriod,
    attendance: Vec<AttendanceSummary>,
    policy: &PayrollPolicy,
) -> EngineResult<(PayPeriod, PayrollSummary)> {
    if period.is_locked() {
        return Err(period.key().locked_error());
    }

    let summary = aggregate_payroll(&PayrollInput::from_period(period, attendance), policy)?;

    let mut updated = period.clone();
    updated.advance(PayPeriodStatus::Calculated)?;
    updated.totals = Some(summary.totals.clone());
    Ok((updated, summary))
}

/// Aggregates many workers; one worker's failure does not stop the others.
pub fn aggregate_batch(inputs: &[PayrollInput], policy: &PayrollPolicy) -> Vec<BatchOutcome> {
    inputs
        .iter()
        .map(|input| {
            let result = aggregate_payroll(input, policy);
            if let Err(err) = &result {
                warn!(user_id = %input.user_id, error = %err, "Pay period aggregation failed");
            }
            BatchOutcome {
                user_id: input.user_id.clone(),
                result,
            }
        })
        .collect()
}

fn resolve_line(
    event: &PayrollEvent,
    rate: Decimal,
    policy: &PayrollPolicy,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<PayrollLine> {
    let effect = event.kind.effect();

    if let Some(hours) = event.hours {
        if hours.is_sign_negative() && !hours.is_zero() {
            return Err(EngineError::InvalidAmount {
                subject: format!("{}.hours", event.id),
                amount: hours,
            });
        }
        if let Some(amount) = hour_based_amount(event.kind, hours, rate, policy)? {
            if !event.amount.is_zero() {
                warn!(
                    event_id = %event.id,
                    stored = %event.amount,
                    derived = %amount,
                    "Stored amount replaced by hour-based amount"
                );
                warnings.push(AuditWarning {
                    code: "AMOUNT_OVERRIDDEN_BY_HOURS".to_string(),
                    message: format!(
                        "Event '{}' stores {} but {} hours give {}; hours used",
                        event.id, event.amount, hours, amount
                    ),
                    severity: "low".to_string(),
                });
            }
            let effective_rate = match hour_multiplier(event.kind, policy) {
                Some(multiplier) => Some(round_money(
                    checked_mul(rate, multiplier, "effective hourly rate")?,
                    policy,
                )),
                None => None,
            };
            return Ok(PayrollLine {
                event_id: event.id.clone(),
                date: event.date,
                kind: event.kind,
                effect,
                hours: Some(hours),
                rate: effective_rate,
                amount,
                description: event.description.clone(),
            });
        }
        warnings.push(AuditWarning {
            code: "HOURS_IGNORED".to_string(),
            message: format!(
                "Event '{}' of kind {} is not hour-based; stored amount used",
                event.id, event.kind
            ),
            severity: "low".to_string(),
        });
    }

    if event.amount.is_sign_negative() && !event.amount.is_zero() {
        warn!(
            event_id = %event.id,
            amount = %event.amount,
            "Coercing negative legacy amount to its magnitude"
        );
        warnings.push(AuditWarning {
            code: "NEGATIVE_LEGACY_AMOUNT".to_string(),
            message: format!(
                "Event '{}' stores {}; counted as {}",
                event.id,
                event.amount,
                event.amount.abs()
            ),
            severity: "medium".to_string(),
        });
    }

    Ok(PayrollLine {
        event_id: event.id.clone(),
        date: event.date,
        kind: event.kind,
        effect,
        hours: None,
        rate: None,
        amount: round_money(event.amount.abs(), policy),
        description: event.description.clone(),
    })
}

fn describe_line(line: &PayrollLine) -> String {
    let verb = match line.effect {
        EventEffect::Addition => "added to",
        EventEffect::Deduction => "deducted from",
        EventEffect::Neutral => "recorded without affecting",
    };
    match (line.hours, line.rate) {
        (Some(hours), Some(rate)) => format!(
            "{} of {} hours x ${} = ${} {} pay",
            line.kind,
            hours.normalize(),
            rate,
            line.amount,
            verb
        ),
        _ => format!("{} of ${} {} pay", line.kind, line.amount, verb),
    }
}

fn build_totals(
    base_salary: Decimal,
    lines: &[PayrollLine],
    policy: &PayrollPolicy,
) -> EngineResult<PayrollTotals> {
    let mut by_kind: BTreeMap<PayrollEventKind, Decimal> = BTreeMap::new();
    let mut total_additions = Decimal::ZERO;
    let mut total_deductions = Decimal::ZERO;
    let mut informational_count = 0;

    for line in lines {
        let kind_total = by_kind.entry(line.kind).or_insert(Decimal::ZERO);
        *kind_total = checked_add(*kind_total, line.amount, "per-kind total")?;
        match line.effect {
            EventEffect::Addition => {
                total_additions = checked_add(total_additions, line.amount, "total additions")?;
            }
            EventEffect::Deduction => {
                total_deductions = checked_add(total_deductions, line.amount, "total deductions")?;
            }
            EventEffect::Neutral => informational_count += 1,
        }
    }

    let gross = checked_add(base_salary, total_additions, "final amount")?;
    let net = checked_sub(gross, total_deductions, "final amount")?;

    Ok(PayrollTotals {
        base_salary,
        total_additions,
        total_deductions,
        final_amount: round_money(net, policy),
        by_kind,
        event_count: lines.len(),
        informational_count,
    })
}

fn build_timeline(
    range: &TimeRange,
    lines: &[PayrollLine],
    attendance: &[AttendanceSummary],
) -> Vec<TimelineDay> {
    let mut attendance_by_day: BTreeMap<NaiveDate, &AttendanceSummary> = BTreeMap::new();
    for summary in attendance.iter().filter(|a| range.contains(a.date)) {
        attendance_by_day.insert(summary.date, summary);
    }

    range
        .iter_days()
        .map(|date| TimelineDay {
            date,
            lines: lines.iter().filter(|l| l.date == date).cloned().collect(),
            attendance: attendance_by_day.get(&date).map(|a| (*a).clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(id: &str, kind: PayrollEventKind, amount: &str, day: &str) -> PayrollEvent {
        PayrollEvent::new(id, "worker_1", kind, dec(amount), date(day), "").unwrap()
    }

    fn hourly(id: &str, kind: PayrollEventKind, hours: &str, day: &str) -> PayrollEvent {
        PayrollEvent::hourly(id, "worker_1", kind, dec(hours), date(day), "").unwrap()
    }

    impl PayrollInput {
        fn with_hours(mut self, id: &str, hours: Decimal) -> Self {
            for event in self.events.iter_mut().filter(|e| e.id == id) {
                event.hours = Some(hours);
            }
            self
        }
    }

    fn input(events: Vec<PayrollEvent>) -> PayrollInput {
        PayrollInput {
            user_id: "worker_1".to_string(),
            range: TimeRange::parse("2024-03-06", "2024-03-20").unwrap(),
            base_salary: dec("50000"),
            events,
            attendance: vec![],
        }
    }

    #[test]
    fn test_bonus_absence_and_tardiness_scenario() {
        let summary = aggregate_payroll(
            &input(vec![
                event("e1", PayrollEventKind::Bonus, "5000", "2024-03-07"),
                event("e2", PayrollEventKind::Absence, "2000", "2024-03-08"),
                hourly("e3", PayrollEventKind::Tardiness, "2", "2024-03-11"),
            ]),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(summary.hourly_rate, dec("555.56"));
        assert_eq!(summary.lines[2].amount, dec("1111.11"));
        assert_eq!(summary.totals.total_additions, dec("5000"));
        assert_eq!(summary.totals.total_deductions, dec("3111.11"));
        assert_eq!(summary.totals.final_amount, dec("51888.89"));
    }

    #[test]
    fn test_no_events_pays_base_salary() {
        let summary = aggregate_payroll(&input(vec![]), &PayrollPolicy::default()).unwrap();
        assert_eq!(summary.totals.final_amount, dec("50000"));
        assert_eq!(summary.totals.event_count, 0);
        assert!(summary.totals.by_kind.is_empty());
    }

    #[test]
    fn test_neutral_events_are_recorded_but_not_totaled() {
        let summary = aggregate_payroll(
            &input(vec![
                event("e1", PayrollEventKind::Vacation, "1000", "2024-03-07"),
                event("e2", PayrollEventKind::SickLeave, "0", "2024-03-08"),
                event("e3", PayrollEventKind::PermittedLeave, "300", "2024-03-09"),
            ]),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(summary.totals.final_amount, dec("50000"));
        assert_eq!(summary.totals.informational_count, 3);
        assert_eq!(summary.totals.event_count, 3);
        assert_eq!(summary.totals.by_kind[&PayrollEventKind::Vacation], dec("1000"));
    }

    #[test]
    fn test_every_deduction_kind_reduces_pay() {
        let summary = aggregate_payroll(
            &input(vec![
                event("e1", PayrollEventKind::Absence, "100", "2024-03-07"),
                event("e2", PayrollEventKind::Tardiness, "100", "2024-03-07"),
                event("e3", PayrollEventKind::EarlyDeparture, "100", "2024-03-07"),
                event("e4", PayrollEventKind::Loan, "100", "2024-03-07"),
                event("e5", PayrollEventKind::Penalty, "100", "2024-03-07"),
            ]),
            &PayrollPolicy::default(),
        )
        .unwrap();
        assert_eq!(summary.totals.total_deductions, dec("500"));
        assert_eq!(summary.totals.final_amount, dec("49500"));
    }

    #[test]
    fn test_overtime_hours_add_at_one_and_a_half() {
        let mut payroll = input(vec![hourly("e1", PayrollEventKind::Overtime, "4", "2024-03-09")]);
        payroll.base_salary = dec("45000");
        let summary = aggregate_payroll(&payroll, &PayrollPolicy::default()).unwrap();
        // 45000 / 10 / 9 = 500; 500 x 1.5 x 4 = 3000
        assert_eq!(summary.lines[0].amount, dec("3000"));
        assert_eq!(summary.lines[0].rate, Some(dec("750")));
        assert_eq!(summary.totals.final_amount, dec("48000"));
    }

    #[test]
    fn test_legacy_negative_amounts_count_by_magnitude() {
        let mut legacy = event("e1", PayrollEventKind::Loan, "0", "2024-03-07");
        legacy.amount = dec("-1500");
        let summary = aggregate_payroll(&input(vec![legacy]), &PayrollPolicy::default()).unwrap();

        assert_eq!(summary.totals.total_deductions, dec("1500"));
        assert_eq!(summary.totals.final_amount, dec("48500"));
        assert!(
            summary
                .audit_trace
                .warnings
                .iter()
                .any(|w| w.code == "NEGATIVE_LEGACY_AMOUNT")
        );
    }

    #[test]
    fn test_events_outside_period_or_user_are_ignored() {
        let mut foreign = event("e2", PayrollEventKind::Bonus, "900", "2024-03-07");
        foreign.user_id = "worker_2".to_string();
        let summary = aggregate_payroll(
            &input(vec![
                event("e1", PayrollEventKind::Bonus, "700", "2024-03-21"),
                foreign,
            ]),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(summary.totals.event_count, 0);
        assert_eq!(summary.totals.final_amount, dec("50000"));
        let codes: Vec<_> = summary
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["EVENT_OUTSIDE_PERIOD", "FOREIGN_USER_EVENT"]);
    }

    #[test]
    fn test_negative_base_salary_is_rejected() {
        let mut payroll = input(vec![]);
        payroll.base_salary = dec("-1");
        let result = aggregate_payroll(&payroll, &PayrollPolicy::default());
        assert!(matches!(result, Err(EngineError::InvalidAmount { .. })));
    }

    #[test]
    fn test_zero_working_days_policy_is_rejected() {
        let policy = PayrollPolicy {
            working_days_per_period: 0,
            ..PayrollPolicy::default()
        };
        let result = aggregate_payroll(
            &input(vec![event("e1", PayrollEventKind::Bonus, "10", "2024-03-07")]),
            &policy,
        );
        match result {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "working_days_per_period")
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_totals_beyond_decimal_range_are_an_error() {
        let mut payroll = input(vec![event("e1", PayrollEventKind::Bonus, "1", "2024-03-07")]);
        payroll.base_salary = Decimal::MAX;
        let result = aggregate_payroll(&payroll, &PayrollPolicy::default());
        assert!(matches!(result, Err(EngineError::AmountOverflow { .. })));
    }

    #[test]
    fn test_huge_overtime_hours_are_an_error() {
        let result = aggregate_payroll(
            &input(vec![hourly("e1", PayrollEventKind::Overtime, "0", "2024-03-07")])
                .with_hours("e1", Decimal::MAX),
            &PayrollPolicy::default(),
        );
        assert!(matches!(result, Err(EngineError::AmountOverflow { .. })));
    }

    #[test]
    fn test_negative_hours_are_rejected() {
        let result = aggregate_payroll(
            &input(vec![hourly("e1", PayrollEventKind::Tardiness, "0", "2024-03-07")])
                .with_hours("e1", dec("-2")),
            &PayrollPolicy::default(),
        );
        match result {
            Err(EngineError::InvalidAmount { subject, amount }) => {
                assert_eq!(subject, "e1.hours");
                assert_eq!(amount, dec("-2"));
            }
            other => panic!("Expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_hours_override_stored_amount_with_warning() {
        let mut tardy = hourly("e1", PayrollEventKind::Tardiness, "2", "2024-03-07");
        tardy.amount = dec("400");
        let summary = aggregate_payroll(&input(vec![tardy]), &PayrollPolicy::default()).unwrap();

        assert_eq!(summary.lines[0].amount, dec("1111.11"));
        assert_eq!(summary.totals.final_amount, dec("48888.89"));
        let warning = summary
            .audit_trace
            .warnings
            .iter()
            .find(|w| w.code == "AMOUNT_OVERRIDDEN_BY_HOURS")
            .unwrap();
        assert!(warning.message.contains("e1"));
    }

    #[test]
    fn test_hours_without_stored_amount_do_not_warn() {
        let summary = aggregate_payroll(
            &input(vec![hourly("e1", PayrollEventKind::Tardiness, "2", "2024-03-07")]),
            &PayrollPolicy::default(),
        )
        .unwrap();
        assert!(summary.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_timeline_has_one_day_per_calendar_day() {
        let mut payroll = input(vec![
            event("e1", PayrollEventKind::Bonus, "10", "2024-03-07"),
            event("e2", PayrollEventKind::Penalty, "5", "2024-03-07"),
        ]);
        payroll.attendance = vec![AttendanceSummary {
            date: date("2024-03-07"),
            check_in: NaiveTime::from_hms_opt(8, 0, 0),
            check_out: NaiveTime::from_hms_opt(17, 0, 0),
            total_hours: Some(dec("9")),
        }];
        let summary = aggregate_payroll(&payroll, &PayrollPolicy::default()).unwrap();

        assert_eq!(summary.timeline.len(), 15);
        assert_eq!(summary.timeline[0].date, date("2024-03-06"));
        assert_eq!(summary.timeline[14].date, date("2024-03-20"));

        let day = &summary.timeline[1];
        assert_eq!(day.date, date("2024-03-07"));
        let ids: Vec<_> = day.lines.iter().map(|l| l.event_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert_eq!(day.attendance.as_ref().unwrap().total_hours, Some(dec("9")));
        assert!(summary.timeline[0].attendance.is_none());
    }

    #[test]
    fn test_repeated_runs_yield_identical_totals() {
        let payroll = input(vec![
            event("e1", PayrollEventKind::Bonus, "5000", "2024-03-07"),
            hourly("e2", PayrollEventKind::EarlyDeparture, "1.25", "2024-03-08"),
        ]);
        let first = aggregate_payroll(&payroll, &PayrollPolicy::default()).unwrap();
        let second = aggregate_payroll(&payroll, &PayrollPolicy::default()).unwrap();
        assert_eq!(first.totals, second.totals);
        assert_eq!(first.lines, second.lines);
        assert_eq!(first.timeline, second.timeline);
        assert_eq!(
            first.totals.final_amount.to_string(),
            second.totals.final_amount.to_string()
        );
    }

    #[test]
    fn test_audit_trace_records_every_counted_event() {
        let summary = aggregate_payroll(
            &input(vec![
                event("e1", PayrollEventKind::Bonus, "5000", "2024-03-07"),
                event("e2", PayrollEventKind::Absence, "2000", "2024-03-08"),
            ]),
            &PayrollPolicy::default(),
        )
        .unwrap();
        let rules: Vec<_> = summary
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rules,
            vec!["hourly_rate", "classify_event", "classify_event", "final_amount"]
        );
        let numbers: Vec<_> = summary.audit_trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_recalculate_replaces_totals_and_marks_calculated() {
        let mut period = PayPeriod::open(
            "worker_1",
            TimeRange::parse("2024-03-06", "2024-03-20").unwrap(),
            dec("50000"),
        );
        period.events = vec![event("e1", PayrollEventKind::Bonus, "5000", "2024-03-07")];

        let (calculated, _) = recalculate_period(&period, vec![], &PayrollPolicy::default()).unwrap();
        assert_eq!(calculated.status, PayPeriodStatus::Calculated);
        assert_eq!(calculated.totals.as_ref().unwrap().final_amount, dec("55000"));

        let mut edited = calculated.clone();
        edited.events = vec![event("e2", PayrollEventKind::Penalty, "1000", "2024-03-07")];
        let (again, _) = recalculate_period(&edited, vec![], &PayrollPolicy::default()).unwrap();
        assert_eq!(again.totals.as_ref().unwrap().final_amount, dec("49000"));
        assert_eq!(again.totals.as_ref().unwrap().total_additions, Decimal::ZERO);
    }

    #[test]
    fn test_recalculate_paid_period_is_locked() {
        let mut period = PayPeriod::open(
            "worker_1",
            TimeRange::parse("2024-03-06", "2024-03-20").unwrap(),
            dec("50000"),
        );
        period.events = vec![event("e1", PayrollEventKind::Bonus, "5000", "2024-03-07")];
        let (mut paid, _) = recalculate_period(&period, vec![], &PayrollPolicy::default()).unwrap();
        paid.mark_paid(Utc::now()).unwrap();
        let totals_before = paid.totals.clone();

        paid.events.push(event("e2", PayrollEventKind::Bonus, "1", "2024-03-08"));
        match recalculate_period(&paid, vec![], &PayrollPolicy::default()) {
            Err(EngineError::PeriodLocked { user_id, .. }) => assert_eq!(user_id, "worker_1"),
            other => panic!("Expected PeriodLocked, got {:?}", other),
        }
        assert_eq!(paid.totals, totals_before);
    }

    #[test]
    fn test_batch_continues_after_one_failure() {
        let good = input(vec![event("e1", PayrollEventKind::Bonus, "10", "2024-03-07")]);
        let mut bad = input(vec![]);
        bad.user_id = "worker_9".to_string();
        bad.base_salary = dec("-5");
        let mut other = input(vec![]);
        other.user_id = "worker_3".to_string();

        let outcomes = aggregate_batch(&[good, bad, other], &PayrollPolicy::default());
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[1].user_id, "worker_9");
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
    }
}
