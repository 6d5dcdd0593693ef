//! Calculation logic for the payroll engine.
//!
//! This module contains the pure arithmetic of a payroll run: progressive
//! income tax, standard deductions, and employee and employer statutory
//! contributions. Every calculation returns its value together with the
//! [`AuditStep`](crate::models::AuditStep) that explains it.

mod money;
mod progressive_tax;
mod standard_deduction;
mod statutory;

pub use money::{MONEY_DECIMAL_PLACES, round_money};
pub use progressive_tax::{
    BracketSlice, PROGRESSIVE_TAX_RULE_ID, PeriodTaxResult, ProgressiveTaxResult,
    calculate_period_tax, calculate_progressive_tax, is_terminal_bracket,
};
pub use standard_deduction::{
    AppliedDeduction, STANDARD_DEDUCTIONS_RULE_ID, StandardDeductionResult,
    calculate_standard_deductions, deduction_amount,
};
pub use statutory::{
    EMPLOYEE_CONTRIBUTIONS_RULE_ID, EMPLOYER_CONTRIBUTIONS_RULE_ID, StatutoryResult,
    calculate_employee_contributions, calculate_employer_contributions, contribution_base,
};
