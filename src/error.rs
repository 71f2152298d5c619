//! Error types for the workshop engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition raised by calendar layout and payroll
//! reconciliation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the workshop engine.
///
/// All operations in the engine return this error type. Errors are local to
/// the record or worker that produced them, so a batch caller can keep going
/// after one failure.
///
/// # Example
///
/// ```
/// use workshop_engine::error::EngineError;
///
/// let error = EngineError::UnknownEventKind {
///     kind: "HOLIDAY_PAY".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown payroll event kind: HOLIDAY_PAY");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A range whose end falls before its start.
    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange {
        /// The requested start date.
        start: NaiveDate,
        /// The requested end date.
        end: NaiveDate,
    },

    /// A date string that could not be parsed.
    #[error("Invalid date: '{value}'")]
    InvalidDate {
        /// The raw value that failed to parse.
        value: String,
    },

    /// A calendar month outside 1..=12, or a year chrono cannot represent.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// A payroll event kind outside the closed set of known kinds.
    #[error("Unknown payroll event kind: {kind}")]
    UnknownEventKind {
        /// The kind that was not recognised.
        kind: String,
    },

    /// A negative magnitude where only non-negative values are accepted.
    #[error("Invalid amount for {subject}: {amount} must not be negative")]
    InvalidAmount {
        /// What the amount belongs to (an event id, or a field name).
        subject: String,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Money arithmetic exceeded the range of a decimal.
    #[error("Amount overflow while computing {subject}")]
    AmountOverflow {
        /// What was being computed.
        subject: String,
    },

    /// The pay period has been paid and can no longer be recalculated.
    #[error("Pay period {start}..{end} for user '{user_id}' is paid and locked")]
    PeriodLocked {
        /// The worker the period belongs to.
        user_id: String,
        /// The first day of the period.
        start: NaiveDate,
        /// The last day of the period.
        end: NaiveDate,
    },

    /// A status change that does not move the period forward.
    #[error("Invalid pay period status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// No stored pay period matches the requested key.
    #[error("Pay period {start}..{end} for user '{user_id}' not found")]
    PeriodNotFound {
        /// The worker the period belongs to.
        user_id: String,
        /// The first day of the period.
        start: NaiveDate,
        /// The last day of the period.
        end: NaiveDate,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engine cannot use.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The persistence collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_invalid_range_displays_both_dates() {
        let error = EngineError::InvalidRange {
            start: date(2024, 3, 10),
            end: date(2024, 3, 1),
        };
        assert_eq!(
            error.to_string(),
            "Invalid range: end 2024-03-01 is before start 2024-03-10"
        );
    }

    #[test]
    fn test_amount_overflow_displays_subject() {
        let error = EngineError::AmountOverflow {
            subject: "final amount".to_string(),
        };
        assert_eq!(error.to_string(), "Amount overflow while computing final amount");
    }

    #[test]
    fn test_unknown_event_kind_displays_kind() {
        let error = EngineError::UnknownEventKind {
            kind: "COMMISSION".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown payroll event kind: COMMISSION");
    }

    #[test]
    fn test_invalid_amount_displays_subject_and_amount() {
        let error = EngineError::InvalidAmount {
            subject: "evt_001".to_string(),
            amount: Decimal::from_str("-250.00").unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid amount for evt_001: -250.00 must not be negative"
        );
    }

    #[test]
    fn test_period_locked_displays_user_and_range() {
        let error = EngineError::PeriodLocked {
            user_id: "worker_7".to_string(),
            start: date(2024, 3, 6),
            end: date(2024, 3, 20),
        };
        assert_eq!(
            error.to_string(),
            "Pay period 2024-03-06..2024-03-20 for user 'worker_7' is paid and locked"
        );
    }

    #[test]
    fn test_invalid_status_transition_displays_states() {
        let error = EngineError::InvalidStatusTransition {
            from: "PAID".to_string(),
            to: "CALCULATED".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid pay period status transition: PAID -> CALCULATED"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_month_displays_year_and_month() {
        let error = EngineError::InvalidMonth {
            year: 2024,
            month: 13,
        };
        assert_eq!(error.to_string(), "Invalid month: 2024-13");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_storage_error() -> EngineResult<()> {
            Err(EngineError::Storage {
                message: "lock poisoned".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_storage_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
