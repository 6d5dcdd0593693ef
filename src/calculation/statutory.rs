//! Statutory contribution calculation.
//!
//! Each contribution applies its employee and employer rates to gross salary,
//! capped at `max_contribution_base` when set. Employee items reduce net pay;
//! employer items add to the employer's cost.

use rust_decimal::Decimal;

use crate::models::{AuditStep, PayrollComponent, StatutoryContribution, statutory_code_for};

use super::money::round_money;

/// Rule id recorded for employee contribution steps.
pub const EMPLOYEE_CONTRIBUTIONS_RULE_ID: &str = "statutory_employee";
/// Rule id recorded for employer contribution steps.
pub const EMPLOYER_CONTRIBUTIONS_RULE_ID: &str = "statutory_employer";

/// The result of a statutory contribution calculation.
#[derive(Debug, Clone)]
pub struct StatutoryResult {
    /// One statutory component per configured contribution.
    pub items: Vec<PayrollComponent>,
    /// Sum of the item amounts.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The salary a contribution's rates apply to: gross, capped at the
/// contribution's maximum base. Never negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::contribution_base;
/// use payroll_engine::models::StatutoryContribution;
/// use rust_decimal_macros::dec;
///
/// let esi = StatutoryContribution::new("ESI", dec!(0.0075), dec!(0.0325), Some(dec!(21000)));
/// assert_eq!(contribution_base(dec!(115350), &esi), dec!(21000));
/// assert_eq!(contribution_base(dec!(15000), &esi), dec!(15000));
/// ```
pub fn contribution_base(gross: Decimal, contribution: &StatutoryContribution) -> Decimal {
    let base = contribution
        .max_contribution_base
        .map_or(gross, |cap| gross.min(cap));
    base.max(Decimal::ZERO)
}

/// Calculates the employee side of every contribution.
///
/// Items are named after the contribution and coded with
/// [`statutory_code_for`] (e.g., "Provident Fund" → `provident_fund`).
pub fn calculate_employee_contributions(
    gross: Decimal,
    contributions: &[StatutoryContribution],
    step_number: u32,
) -> StatutoryResult {
    let items = contributions
        .iter()
        .map(|c| {
            PayrollComponent::statutory(
                c.name.clone(),
                round_money(contribution_base(gross, c) * c.employee_rate),
                statutory_code_for(&c.name),
            )
        })
        .collect();

    build_result(
        gross,
        items,
        step_number,
        EMPLOYEE_CONTRIBUTIONS_RULE_ID,
        "Employee Statutory Contributions",
    )
}

/// Calculates the employer side of every contribution.
///
/// Items are named "Employer {name}" and coded `employer_{code}`.
pub fn calculate_employer_contributions(
    gross: Decimal,
    contributions: &[StatutoryContribution],
    step_number: u32,
) -> StatutoryResult {
    let items = contributions
        .iter()
        .map(|c| {
            PayrollComponent::statutory(
                format!("Employer {}", c.name),
                round_money(contribution_base(gross, c) * c.employer_rate),
                format!("employer_{}", statutory_code_for(&c.name)),
            )
        })
        .collect();

    build_result(
        gross,
        items,
        step_number,
        EMPLOYER_CONTRIBUTIONS_RULE_ID,
        "Employer Statutory Contributions",
    )
}

fn build_result(
    gross: Decimal,
    items: Vec<PayrollComponent>,
    step_number: u32,
    rule_id: &str,
    rule_name: &str,
) -> StatutoryResult {
    let total: Decimal = items.iter().map(PayrollComponent::amount).sum();

    let reasoning = if items.is_empty() {
        "No statutory contributions configured".to_string()
    } else {
        items
            .iter()
            .map(|item| format!("{} {}", item.name(), item.amount().normalize()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            "gross_salary": gross.normalize().to_string(),
            "contribution_count": items.len()
        }),
        output: serde_json::json!({
            "items": items,
            "total": total.normalize().to_string()
        }),
        reasoning,
    };

    StatutoryResult {
        items,
        total,
        audit_step,
    }
}
