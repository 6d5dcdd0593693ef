//! Pay period model.
//!
//! Payroll is generated per calendar month. A [`PayPeriod`] is the month/year
//! pair that, together with tenant, employee and country, identifies a record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Earliest year accepted for a pay period.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted for a pay period.
pub const MAX_YEAR: i32 = 9999;

/// Number of monthly pay periods in a year.
pub const PERIODS_PER_YEAR: u32 = 12;

/// A monthly pay period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
///
/// let period = PayPeriod::new(3, 2025).unwrap();
/// assert_eq!(period.to_string(), "2025-03");
/// assert!(PayPeriod::new(13, 2025).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The year of the period. Declared first so ordering is chronological.
    pub year: i32,
    /// The month of the period (1-12).
    pub month: u32,
}

impl PayPeriod {
    /// Creates a validated pay period.
    pub fn new(month: u32, year: i32) -> PayrollResult<Self> {
        let period = Self { year, month };
        period.validate()?;
        Ok(period)
    }

    /// Checks that the month is 1-12 and the year is a four-digit year.
    pub fn validate(&self) -> PayrollResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(PayrollError::validation(
                "month",
                format!("must be between 1 and 12, got {}", self.month),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(PayrollError::validation(
                "year",
                format!("must be between {} and {}, got {}", MIN_YEAR, MAX_YEAR, self.year),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_periods() {
        assert!(PayPeriod::new(1, 2025).is_ok());
        assert!(PayPeriod::new(12, 2025).is_ok());
    }

    #[test]
    fn test_month_out_of_range() {
        for month in [0, 13] {
            match PayPeriod::new(month, 2025) {
                Err(PayrollError::Validation { field, .. }) => assert_eq!(field, "month"),
                other => panic!("Expected month validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_year_out_of_range() {
        match PayPeriod::new(6, 1899) {
            Err(PayrollError::Validation { field, .. }) => assert_eq!(field, "year"),
            other => panic!("Expected year validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_periods_order_chronologically() {
        let dec_2024 = PayPeriod::new(12, 2024).unwrap();
        let jan_2025 = PayPeriod::new(1, 2025).unwrap();
        assert!(dec_2024 < jan_2025);
    }

    #[test]
    fn test_display_zero_pads_month() {
        assert_eq!(PayPeriod::new(7, 2025).unwrap().to_string(), "2025-07");
    }

    #[test]
    fn test_deserialize_pay_period() {
        let period: PayPeriod = serde_json::from_str(r#"{"month": 4, "year": 2025}"#).unwrap();
        assert_eq!(period, PayPeriod::new(4, 2025).unwrap());
    }
}
