//! Standard deduction calculation.

use rust_decimal::Decimal;

use crate::models::{AuditStep, StandardDeduction};

use super::money::round_money;

/// Rule id recorded for standard deduction steps.
pub const STANDARD_DEDUCTIONS_RULE_ID: &str = "standard_deductions";

/// One applied standard deduction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AppliedDeduction {
    /// Deduction name.
    pub name: String,
    /// Amount subtracted from gross.
    pub amount: Decimal,
}

/// The result of a standard deduction calculation.
#[derive(Debug, Clone)]
pub struct StandardDeductionResult {
    /// Total subtracted from gross before tax.
    pub total: Decimal,
    /// Each deduction as applied.
    pub applied: Vec<AppliedDeduction>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Evaluates the amount of one deduction against gross salary.
///
/// Fixed deductions use their amount. Percentage deductions take that share
/// of gross, rounded to minor units and capped at `max_limit` when set.
pub fn deduction_amount(gross: Decimal, deduction: &StandardDeduction) -> Decimal {
    match (deduction.amount, deduction.percentage) {
        (Some(amount), _) => amount,
        (None, Some(percentage)) => {
            let amount = round_money(gross.max(Decimal::ZERO) * percentage);
            deduction.max_limit.map_or(amount, |limit| amount.min(limit))
        }
        (None, None) => Decimal::ZERO,
    }
}

/// Sums the standard deductions that apply to `gross`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_standard_deductions;
/// use payroll_engine::models::StandardDeduction;
/// use rust_decimal_macros::dec;
///
/// let deductions = vec![
///     StandardDeduction::fixed("Standard Deduction", dec!(50000)),
///     StandardDeduction::percentage("Pension Relief", dec!(0.05), Some(dec!(200))),
/// ];
/// let result = calculate_standard_deductions(dec!(10000), &deductions, 2);
/// assert_eq!(result.total, dec!(50200));
/// ```
pub fn calculate_standard_deductions(
    gross: Decimal,
    deductions: &[StandardDeduction],
    step_number: u32,
) -> StandardDeductionResult {
    let applied: Vec<AppliedDeduction> = deductions
        .iter()
        .map(|d| AppliedDeduction {
            name: d.name.clone(),
            amount: deduction_amount(gross, d),
        })
        .collect();
    let total: Decimal = applied.iter().map(|a| a.amount).sum();

    let reasoning = if applied.is_empty() {
        "No standard deductions configured".to_string()
    } else {
        format!(
            "{} = {}",
            applied
                .iter()
                .map(|a| format!("{} {}", a.name, a.amount.normalize()))
                .collect::<Vec<_>>()
                .join(" + "),
            total.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: STANDARD_DEDUCTIONS_RULE_ID.to_string(),
        rule_name: "Standard Deductions".to_string(),
        input: serde_json::json!({
            "gross_salary": gross.normalize().to_string(),
            "deduction_count": deductions.len()
        }),
        output: serde_json::json!({
            "applied": applied,
            "total": total.normalize().to_string()
        }),
        reasoning,
    };

    StandardDeductionResult {
        total,
        applied,
        audit_step,
    }
}
