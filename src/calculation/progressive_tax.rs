//! Progressive income tax calculation.
//!
//! Income is taxed bracket by bracket: each bracket taxes the slice of income
//! between its `min` and `max` at its marginal rate. Evaluation stops at the
//! bracket that contains the income (see [`is_terminal_bracket`]), so no
//! bracket above the income is ever visited.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, TaxBracket, TaxRule};

use super::money::round_money;

/// Rule id recorded in the audit trace for tax steps.
pub const PROGRESSIVE_TAX_RULE_ID: &str = "progressive_tax";

/// The part of income one bracket taxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Lower threshold of the bracket.
    pub min: Decimal,
    /// Upper threshold of the bracket.
    pub max: Option<Decimal>,
    /// Marginal rate.
    pub rate: Decimal,
    /// Income taxed within this bracket.
    pub taxable_amount: Decimal,
    /// Tax owed on the slice.
    pub tax: Decimal,
}

/// The result of a progressive tax calculation.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxResult {
    /// Total tax, unrounded.
    pub tax: Decimal,
    /// One slice per bracket visited, in ascending order.
    pub slices: Vec<BracketSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns true if evaluation must stop after `bracket` for this income.
///
/// This is the bracket that contains the income: its `max` is at or above the
/// income, or it is open-ended. Brackets after it tax nothing.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::is_terminal_bracket;
/// use payroll_engine::models::TaxBracket;
/// use rust_decimal_macros::dec;
///
/// let bracket = TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.1));
/// assert!(is_terminal_bracket(&bracket, dec!(10000)));
/// assert!(!is_terminal_bracket(&bracket, dec!(10000.01)));
/// ```
pub fn is_terminal_bracket(bracket: &TaxBracket, income: Decimal) -> bool {
    bracket.max.is_none_or(|max| income <= max)
}

/// Calculates the tax owed on `income` under ascending `brackets`.
///
/// For each bracket the taxed slice is `min(income, max) - min` (the whole
/// remainder when `max` is open), clamped at zero. Tax is never negative,
/// never decreases as income grows, and has no jumps at bracket boundaries.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_progressive_tax;
/// use payroll_engine::models::TaxBracket;
/// use rust_decimal_macros::dec;
///
/// let brackets = vec![
///     TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.1)),
///     TaxBracket::new(dec!(10000), None, dec!(0.2)),
/// ];
///
/// let result = calculate_progressive_tax(dec!(15000), &brackets, 1);
/// assert_eq!(result.tax, dec!(2000)); // 10000 * 10% + 5000 * 20%
/// assert_eq!(result.slices.len(), 2);
/// ```
pub fn calculate_progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
    step_number: u32,
) -> ProgressiveTaxResult {
    let mut tax = Decimal::ZERO;
    let mut slices = Vec::new();

    for bracket in brackets {
        let upper = bracket.max.map_or(income, |max| income.min(max));
        let taxable_amount = (upper - bracket.min).max(Decimal::ZERO);
        let slice_tax = taxable_amount * bracket.rate;
        tax += slice_tax;

        slices.push(BracketSlice {
            min: bracket.min,
            max: bracket.max,
            rate: bracket.rate,
            taxable_amount,
            tax: slice_tax,
        });

        if is_terminal_bracket(bracket, income) {
            break;
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: PROGRESSIVE_TAX_RULE_ID.to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "income": income.normalize().to_string(),
            "bracket_count": brackets.len()
        }),
        output: serde_json::json!({
            "tax": tax.normalize().to_string(),
            "brackets_visited": slices.len()
        }),
        reasoning: describe_slices(&slices),
    };

    ProgressiveTaxResult {
        tax,
        slices,
        audit_step,
    }
}

/// The result of taxing one monthly pay period.
#[derive(Debug, Clone)]
pub struct PeriodTaxResult {
    /// Tax for the pay period, rounded to minor units.
    pub tax: Decimal,
    /// Income in the rule's bracket period (annualized for annual rules).
    pub bracket_income: Decimal,
    /// Tax for the whole bracket period, unrounded.
    pub bracket_tax: Decimal,
    /// Bracket slices of the bracket-period calculation.
    pub slices: Vec<BracketSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the monthly tax on `taxable_income` under `rule`.
///
/// Annual rules annualize the monthly income, run the brackets, and divide
/// the annual tax back over twelve months. Monthly rules use the brackets
/// directly.
pub fn calculate_period_tax(
    taxable_income: Decimal,
    rule: &TaxRule,
    step_number: u32,
) -> PeriodTaxResult {
    let months = Decimal::from(rule.bracket_period.months());
    let bracket_income = taxable_income * months;
    let progressive = calculate_progressive_tax(bracket_income, &rule.tax_brackets, step_number);
    let tax = round_money(progressive.tax / months);

    let audit_step = AuditStep {
        step_number,
        rule_id: PROGRESSIVE_TAX_RULE_ID.to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "country": rule.country,
            "rule_version": rule.version,
            "taxable_income": taxable_income.normalize().to_string(),
            "bracket_period": rule.bracket_period,
            "bracket_income": bracket_income.normalize().to_string()
        }),
        output: serde_json::json!({
            "bracket_tax": progressive.tax.normalize().to_string(),
            "tax": tax.normalize().to_string(),
            "brackets_visited": progressive.slices.len()
        }),
        reasoning: if rule.bracket_period.months() > 1 {
            format!(
                "Annualized {} x 12 = {}; {}; annual tax {} / 12 = {}",
                taxable_income.normalize(),
                bracket_income.normalize(),
                describe_slices(&progressive.slices),
                progressive.tax.normalize(),
                tax.normalize()
            )
        } else {
            format!("{}; tax {}", describe_slices(&progressive.slices), tax.normalize())
        },
    };

    PeriodTaxResult {
        tax,
        bracket_income,
        bracket_tax: progressive.tax,
        slices: progressive.slices,
        audit_step,
    }
}

fn describe_slices(slices: &[BracketSlice]) -> String {
    if slices.is_empty() {
        return "No brackets configured".to_string();
    }
    slices
        .iter()
        .map(|s| {
            format!(
                "{} x {}% = {}",
                s.taxable_amount.normalize(),
                (s.rate * Decimal::ONE_HUNDRED).normalize(),
                s.tax.normalize()
            )
        })
        .collect::<Vec<_>>()
        .join(" + ")
}
