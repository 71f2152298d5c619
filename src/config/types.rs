//! Configuration types for payroll reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `payroll.yaml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the workshop the configuration belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopMetadata {
    /// Display name of the workshop.
    pub name: String,
    /// ISO currency code amounts are expressed in.
    pub currency: String,
}

impl Default for WorkshopMetadata {
    fn default() -> Self {
        Self {
            name: "Workshop".to_string(),
            currency: "DZD".to_string(),
        }
    }
}

/// Rules used to derive hour-based amounts and round money.
///
/// The hourly rate is `base_salary / working_days_per_period / paid_hours_per_day`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Working days in one pay period.
    pub working_days_per_period: u32,
    /// Paid hours in one working day.
    pub paid_hours_per_day: u32,
    /// Multiplier applied to the hourly rate for overtime.
    pub overtime_multiplier: Decimal,
    /// Multiplier applied to the hourly rate for tardiness and early departure.
    pub hourly_deduction_multiplier: Decimal,
    /// Decimal places money is rounded to.
    pub decimal_places: u32,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            working_days_per_period: 10,
            paid_hours_per_day: 9,
            overtime_multiplier: Decimal::new(15, 1),
            hourly_deduction_multiplier: Decimal::ONE,
            decimal_places: 2,
        }
    }
}

impl PayrollPolicy {
    /// Rejects policies that would divide by zero or flip signs.
    pub fn validate(&self) -> EngineResult<()> {
        if self.working_days_per_period == 0 {
            return Err(EngineError::InvalidConfig {
                field: "working_days_per_period".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.paid_hours_per_day == 0 {
            return Err(EngineError::InvalidConfig {
                field: "paid_hours_per_day".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.overtime_multiplier.is_sign_negative() {
            return Err(EngineError::InvalidConfig {
                field: "overtime_multiplier".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.hourly_deduction_multiplier.is_sign_negative() {
            return Err(EngineError::InvalidConfig {
                field: "hourly_deduction_multiplier".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.decimal_places > 10 {
            return Err(EngineError::InvalidConfig {
                field: "decimal_places".to_string(),
                message: "must be at most 10".to_string(),
            });
        }
        Ok(())
    }
}

/// The complete configuration loaded from `payroll.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopConfig {
    /// Workshop metadata.
    #[serde(default)]
    pub metadata: WorkshopMetadata,
    /// Payroll rules.
    #[serde(default)]
    pub policy: PayrollPolicy,
}
