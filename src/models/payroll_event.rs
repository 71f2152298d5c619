//! Payroll events and their fixed classification.
//!
//! An event stores only a non-negative magnitude. Whether it adds to or
//! deducts from pay is derived from its [`PayrollEventKind`] at aggregation
//! time and is never stored.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse_date;
use crate::error::{EngineError, EngineResult};

/// The closed set of payroll event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollEventKind {
    /// Discretionary bonus.
    Bonus,
    /// Hours worked beyond the paid day.
    Overtime,
    /// Unpaid day of absence.
    Absence,
    /// Late arrival, charged per hour.
    Tardiness,
    /// Leaving before the end of the day, charged per hour.
    EarlyDeparture,
    /// Repayment of a salary advance.
    Loan,
    /// Disciplinary penalty.
    Penalty,
    /// Paid vacation day.
    Vacation,
    /// Sick leave day.
    SickLeave,
    /// Leave granted by a supervisor.
    PermittedLeave,
}

/// How an event kind affects the payable amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventEffect {
    /// Added to the base salary.
    Addition,
    /// Subtracted from the base salary.
    Deduction,
    /// Recorded on the timeline only.
    Neutral,
}

impl PayrollEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [PayrollEventKind; 10] = [
        PayrollEventKind::Bonus,
        PayrollEventKind::Overtime,
        PayrollEventKind::Absence,
        PayrollEventKind::Tardiness,
        PayrollEventKind::EarlyDeparture,
        PayrollEventKind::Loan,
        PayrollEventKind::Penalty,
        PayrollEventKind::Vacation,
        PayrollEventKind::SickLeave,
        PayrollEventKind::PermittedLeave,
    ];

    /// The effect this kind has on the final amount.
    ///
    /// # Example
    ///
    /// ```
    /// use workshop_engine::models::{EventEffect, PayrollEventKind};
    ///
    /// assert_eq!(PayrollEventKind::Bonus.effect(), EventEffect::Addition);
    /// assert_eq!(PayrollEventKind::Loan.effect(), EventEffect::Deduction);
    /// assert_eq!(PayrollEventKind::SickLeave.effect(), EventEffect::Neutral);
    /// ```
    pub fn effect(self) -> EventEffect {
        match self {
            PayrollEventKind::Bonus | PayrollEventKind::Overtime => EventEffect::Addition,
            PayrollEventKind::Absence
            | PayrollEventKind::Tardiness
            | PayrollEventKind::EarlyDeparture
            | PayrollEventKind::Loan
            | PayrollEventKind::Penalty => EventEffect::Deduction,
            PayrollEventKind::Vacation
            | PayrollEventKind::SickLeave
            | PayrollEventKind::PermittedLeave => EventEffect::Neutral,
        }
    }

    /// Kinds whose amount can be derived from a number of hours.
    pub fn is_hour_based(self) -> bool {
        matches!(
            self,
            PayrollEventKind::Overtime
                | PayrollEventKind::Tardiness
                | PayrollEventKind::EarlyDeparture
        )
    }

    /// The wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            PayrollEventKind::Bonus => "BONUS",
            PayrollEventKind::Overtime => "OVERTIME",
            PayrollEventKind::Absence => "ABSENCE",
            PayrollEventKind::Tardiness => "TARDINESS",
            PayrollEventKind::EarlyDeparture => "EARLY_DEPARTURE",
            PayrollEventKind::Loan => "LOAN",
            PayrollEventKind::Penalty => "PENALTY",
            PayrollEventKind::Vacation => "VACATION",
            PayrollEventKind::SickLeave => "SICK_LEAVE",
            PayrollEventKind::PermittedLeave => "PERMITTED_LEAVE",
        }
    }
}

impl std::fmt::Display for PayrollEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayrollEventKind {
    type Err = EngineError;

    /// Parses a kind name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> EngineResult<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        PayrollEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| EngineError::UnknownEventKind {
                kind: s.to_string(),
            })
    }
}

/// A discrete payroll event for one worker on one day.
///
/// `amount` is a magnitude. For hour-based kinds, `hours` may be set instead,
/// in which case the aggregator derives the amount from the worker's hourly
/// rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEvent {
    /// Identifier assigned by the persistence collaborator.
    pub id: String,
    /// The worker the event belongs to.
    pub user_id: String,
    /// What happened.
    pub kind: PayrollEventKind,
    /// Non-negative magnitude; sign comes from the kind.
    pub amount: Decimal,
    /// Hours for hour-based kinds, when the amount should be derived.
    #[serde(default)]
    pub hours: Option<Decimal>,
    /// The day the event applies to.
    pub date: NaiveDate,
    /// Free-text note.
    #[serde(default)]
    pub description: String,
}

impl PayrollEvent {
    /// Creates a new event with a fixed amount.
    ///
    /// New events must carry a non-negative magnitude.
    ///
    /// # Example
    ///
    /// ```
    /// use workshop_engine::models::{PayrollEvent, PayrollEventKind};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
    /// let bonus = PayrollEvent::new("e1", "w1", PayrollEventKind::Bonus, Decimal::from(5000), date, "");
    /// assert!(bonus.is_ok());
    ///
    /// let negative = PayrollEvent::new("e2", "w1", PayrollEventKind::Loan, Decimal::from(-10), date, "");
    /// assert!(negative.is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        kind: PayrollEventKind,
        amount: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> EngineResult<Self> {
        let id = id.into();
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(EngineError::InvalidAmount {
                subject: id,
                amount,
            });
        }
        Ok(Self {
            id,
            user_id: user_id.into(),
            kind,
            amount,
            hours: None,
            date,
            description: description.into(),
        })
    }

    /// Creates a new hour-based event whose amount is derived at aggregation.
    pub fn hourly(
        id: impl Into<String>,
        user_id: impl Into<String>,
        kind: PayrollEventKind,
        hours: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> EngineResult<Self> {
        let id = id.into();
        if !kind.is_hour_based() {
            return Err(EngineError::InvalidAmount {
                subject: format!("{} ({} is not hour-based)", id, kind),
                amount: hours,
            });
        }
        if hours.is_sign_negative() && !hours.is_zero() {
            return Err(EngineError::InvalidAmount {
                subject: format!("{}.hours", id),
                amount: hours,
            });
        }
        Ok(Self {
            id,
            user_id: user_id.into(),
            kind,
            amount: Decimal::ZERO,
            hours: Some(hours),
            date,
            description: description.into(),
        })
    }

    /// The effect of this event, derived from its kind.
    pub fn effect(&self) -> EventEffect {
        self.kind.effect()
    }
}

/// A payroll event as stored by the persistence collaborator.
///
/// Kinds and dates arrive as free text, and historical rows may carry
/// negative amounts. Converting into [`PayrollEvent`] validates the kind and
/// date but tolerates the sign; the aggregator works on magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollEventRecord {
    /// Identifier assigned by the persistence collaborator.
    pub id: String,
    /// The worker the event belongs to.
    pub user_id: String,
    /// Kind name, e.g. `"TARDINESS"`.
    pub kind: String,
    /// Stored amount, possibly negative for legacy rows.
    #[serde(default)]
    pub amount: Decimal,
    /// Hours for hour-based kinds.
    #[serde(default)]
    pub hours: Option<Decimal>,
    /// Date string, `YYYY-MM-DD` or a timestamp.
    pub date: String,
    /// Free-text note.
    #[serde(default)]
    pub description: String,
}

impl TryFrom<PayrollEventRecord> for PayrollEvent {
    type Error = EngineError;

    fn try_from(record: PayrollEventRecord) -> EngineResult<Self> {
        let kind = record.kind.parse::<PayrollEventKind>()?;
        let date = parse_date(&record.date)?;
        if let Some(hours) = record.hours {
            if hours.is_sign_negative() && !hours.is_zero() {
                return Err(EngineError::InvalidAmount {
                    subject: format!("{}.hours", record.id),
                    amount: hours,
                });
            }
        }
        Ok(PayrollEvent {
            id: record.id,
            user_id: record.user_id,
            kind,
            amount: record.amount,
            hours: record.hours,
            date,
            description: record.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(kind: &str, amount: &str) -> PayrollEventRecord {
        PayrollEventRecord {
            id: "evt_001".to_string(),
            user_id: "worker_1".to_string(),
            kind: kind.to_string(),
            amount: dec(amount),
            hours: None,
            date: "2024-03-08".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_classification_covers_every_kind() {
        let additions: Vec<_> = PayrollEventKind::ALL
            .into_iter()
            .filter(|k| k.effect() == EventEffect::Addition)
            .collect();
        let deductions: Vec<_> = PayrollEventKind::ALL
            .into_iter()
            .filter(|k| k.effect() == EventEffect::Deduction)
            .collect();
        let neutral: Vec<_> = PayrollEventKind::ALL
            .into_iter()
            .filter(|k| k.effect() == EventEffect::Neutral)
            .collect();

        assert_eq!(
            additions,
            vec![PayrollEventKind::Bonus, PayrollEventKind::Overtime]
        );
        assert_eq!(
            deductions,
            vec![
                PayrollEventKind::Absence,
                PayrollEventKind::Tardiness,
                PayrollEventKind::EarlyDeparture,
                PayrollEventKind::Loan,
                PayrollEventKind::Penalty,
            ]
        );
        assert_eq!(
            neutral,
            vec![
                PayrollEventKind::Vacation,
                PayrollEventKind::SickLeave,
                PayrollEventKind::PermittedLeave,
            ]
        );
    }

    #[test]
    fn test_hour_based_kinds() {
        assert!(PayrollEventKind::Overtime.is_hour_based());
        assert!(PayrollEventKind::Tardiness.is_hour_based());
        assert!(PayrollEventKind::EarlyDeparture.is_hour_based());
        assert!(!PayrollEventKind::Absence.is_hour_based());
    }

    #[test]
    fn test_from_str_round_trips_every_kind() {
        for kind in PayrollEventKind::ALL {
            assert_eq!(kind.as_str().parse::<PayrollEventKind>().unwrap(), kind);
        }
        assert_eq!(
            " early_departure ".parse::<PayrollEventKind>().unwrap(),
            PayrollEventKind::EarlyDeparture
        );
    }

    #[test]
    fn test_from_str_unknown_kind_is_an_error() {
        match "COMMISSION".parse::<PayrollEventKind>() {
            Err(EngineError::UnknownEventKind { kind }) => assert_eq!(kind, "COMMISSION"),
            other => panic!("Expected UnknownEventKind, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&PayrollEventKind::SickLeave).unwrap();
        assert_eq!(json, "\"SICK_LEAVE\"");
    }

    #[test]
    fn test_new_rejects_negative_amount() {
        let result = PayrollEvent::new(
            "evt_9",
            "worker_1",
            PayrollEventKind::Penalty,
            dec("-100"),
            date(2024, 3, 8),
            "",
        );
        match result {
            Err(EngineError::InvalidAmount { subject, amount }) => {
                assert_eq!(subject, "evt_9");
                assert_eq!(amount, dec("-100"));
            }
            other => panic!("Expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_hourly_rejects_non_hour_based_kind() {
        let result = PayrollEvent::hourly(
            "evt_3",
            "worker_1",
            PayrollEventKind::Bonus,
            dec("2"),
            date(2024, 3, 8),
            "",
        );
        assert!(matches!(result, Err(EngineError::InvalidAmount { .. })));
    }

    #[test]
    fn test_record_conversion_tolerates_legacy_negative_amount() {
        let event = PayrollEvent::try_from(record("absence", "-2000")).unwrap();
        assert_eq!(event.kind, PayrollEventKind::Absence);
        assert_eq!(event.amount, dec("-2000"));
        assert_eq!(event.date, date(2024, 3, 8));
    }

    #[test]
    fn test_record_conversion_rejects_unknown_kind() {
        let result = PayrollEvent::try_from(record("HOLIDAY_PAY", "10"));
        assert!(matches!(result, Err(EngineError::UnknownEventKind { .. })));
    }

    #[test]
    fn test_record_conversion_normalizes_timestamp_date() {
        let mut rec = record("BONUS", "10");
        rec.date = "2024-03-08T17:45:00".to_string();
        let event = PayrollEvent::try_from(rec).unwrap();
        assert_eq!(event.date, date(2024, 3, 8));
    }
}
