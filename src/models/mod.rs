//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod compliance;
mod component;
mod employee;
mod pay_period;
mod payroll_record;
mod tax_rule;

pub use audit::{AuditStep, AuditTrace};
pub use compliance::{ComplianceCheck, ComplianceStatus};
pub use component::{ComponentKind, PayrollComponent, statutory_code_for, total_amount};
pub use employee::Employee;
pub use pay_period::{MAX_YEAR, MIN_YEAR, PERIODS_PER_YEAR, PayPeriod};
pub use payroll_record::{
    BankDetails, PaymentDetails, PaymentMethod, PayrollRecord, PayrollStatus, RateOrigin,
    RecordKey,
};
pub use tax_rule::{
    BracketPeriod, StandardDeduction, StatutoryContribution, TaxBracket, TaxRule, TaxRulePatch,
};
