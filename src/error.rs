//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing or managing
//! payroll records.

use thiserror::Error;
use uuid::Uuid;

use crate::models::PayrollStatus;

/// The main error type for the payroll engine.
///
/// All fallible operations in the engine return this error type. Use
/// [`PayrollError::kind`] to decide whether a failure is a business outcome
/// (duplicate, invalid transition) or a genuine fault.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// An input value failed validation.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A tax rule is malformed (bracket ordering, rate ranges, deductions).
    #[error("Invalid tax rule for '{country}': {message}")]
    InvalidTaxRule {
        /// The country the rule belongs to.
        country: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// The employee does not exist for the tenant.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was looked up.
        employee_id: String,
    },

    /// The payroll record does not exist for the tenant.
    #[error("Payroll record not found: {record_id}")]
    RecordNotFound {
        /// The record identifier that was looked up.
        record_id: Uuid,
    },

    /// A record already exists for the employee, period and country.
    #[error("Payroll already generated for employee '{employee_id}' in {country} for {month:02}/{year}")]
    DuplicateRecord {
        /// The employee the record belongs to.
        employee_id: String,
        /// The payroll country.
        country: String,
        /// The pay period month.
        month: u32,
        /// The pay period year.
        year: i32,
    },

    /// The requested status change is not permitted from the current status.
    #[error("Payroll record {record_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The record identifier.
        record_id: Uuid,
        /// The record's current status.
        from: PayrollStatus,
        /// The requested status.
        to: PayrollStatus,
    },

    /// An external collaborator (such as the exchange-rate feed) failed.
    #[error("External service '{service}' failed: {message}")]
    ExternalService {
        /// The name of the failing service.
        service: String,
        /// A description of the failure.
        message: String,
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

    /// The persistence or directory collaborator failed.
    #[error("Store error: {message}")]
    Store {
        /// A description of the failure.
        message: String,
    },
}

/// Broad classification of a [`PayrollError`].
///
/// Callers exposing the engine over a transport map `Duplicate` and `Conflict`
/// to client-side business outcomes rather than system faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or configuration data.
    Validation,
    /// A referenced employee or record does not exist.
    NotFound,
    /// The idempotency gate rejected a second generation.
    Duplicate,
    /// A status transition was not allowed.
    Conflict,
    /// An external collaborator failed.
    External,
    /// Configuration or storage failure.
    Internal,
}

impl PayrollError {
    /// Shorthand for a [`PayrollError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidTaxRule { .. } => ErrorKind::Validation,
            Self::EmployeeNotFound { .. } | Self::RecordNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateRecord { .. } => ErrorKind::Duplicate,
            Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::ExternalService { .. } => ErrorKind::External,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } | Self::Store { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns true for errors the caller should report as a business outcome
    /// ("already generated", "already processed") rather than a failure.
    pub fn is_business_outcome(&self) -> bool {
        matches!(self.kind(), ErrorKind::Duplicate | ErrorKind::Conflict)
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = PayrollError::validation("month", "must be between 1 and 12");
        assert_eq!(
            error.to_string(),
            "Invalid value for 'month': must be between 1 and 12"
        );
    }

    #[test]
    fn test_duplicate_record_displays_period() {
        let error = PayrollError::DuplicateRecord {
            employee_id: "emp_001".to_string(),
            country: "India".to_string(),
            month: 3,
            year: 2025,
        };
        assert_eq!(
            error.to_string(),
            "Payroll already generated for employee 'emp_001' in India for 03/2025"
        );
    }

    #[test]
    fn test_invalid_transition_displays_statuses() {
        let error = PayrollError::InvalidTransition {
            record_id: Uuid::nil(),
            from: PayrollStatus::Paid,
            to: PayrollStatus::Cancelled,
        };
        assert_eq!(
            error.to_string(),
            "Payroll record 00000000-0000-0000-0000-000000000000 cannot move from paid to cancelled"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = PayrollError::ConfigNotFound {
            path: "/missing/settings.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/settings.yaml"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            PayrollError::validation("year", "bad").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PayrollError::RecordNotFound {
                record_id: Uuid::nil()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PayrollError::ExternalService {
                service: "rates".to_string(),
                message: "timeout".to_string()
            }
            .kind(),
            ErrorKind::External
        );
        assert_eq!(
            PayrollError::Store {
                message: "down".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_duplicates_and_conflicts_are_business_outcomes() {
        let duplicate = PayrollError::DuplicateRecord {
            employee_id: "emp_001".to_string(),
            country: "UK".to_string(),
            month: 1,
            year: 2025,
        };
        let conflict = PayrollError::InvalidTransition {
            record_id: Uuid::nil(),
            from: PayrollStatus::Draft,
            to: PayrollStatus::Paid,
        };
        assert!(duplicate.is_business_outcome());
        assert!(conflict.is_business_outcome());
        assert!(!PayrollError::validation("month", "bad").is_business_outcome());
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PayrollError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> PayrollResult<()> {
            Err(PayrollError::EmployeeNotFound {
                employee_id: "emp_404".to_string(),
            })
        }

        fn propagates_error() -> PayrollResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
