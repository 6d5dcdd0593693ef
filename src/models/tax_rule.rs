//! Tax rule models.
//!
//! A [`TaxRule`] bundles everything the engine needs to tax one country:
//! progressive brackets, standard deductions and statutory contributions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::PERIODS_PER_YEAR;

/// The period in which bracket thresholds are expressed.
///
/// Payroll runs monthly. Annual brackets are applied to annualized monthly
/// income and the resulting tax is spread back over twelve months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketPeriod {
    /// Thresholds are yearly amounts.
    #[default]
    Annual,
    /// Thresholds are monthly amounts.
    Monthly,
}

impl BracketPeriod {
    /// Number of monthly pay periods one bracket period spans.
    pub fn months(self) -> u32 {
        match self {
            BracketPeriod::Annual => PERIODS_PER_YEAR,
            BracketPeriod::Monthly => 1,
        }
    }
}

/// A contiguous income range taxed at a single marginal rate.
///
/// `max` is `None` only for the last, open-ended bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Lower threshold of the bracket.
    pub min: Decimal,
    /// Upper threshold of the bracket, inclusive.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Marginal rate as a fraction (0.05 for 5%).
    pub rate: Decimal,
}

impl TaxBracket {
    /// Creates a bracket.
    pub fn new(min: Decimal, max: Option<Decimal>, rate: Decimal) -> Self {
        Self { min, max, rate }
    }
}

/// A standard (non-statutory) deduction subtracted from gross before tax.
///
/// Exactly one of `amount` and `percentage` must be set. A percentage
/// deduction may be capped by `max_limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeduction {
    /// Display name of the deduction.
    pub name: String,
    /// Fixed amount per pay period.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Fraction of gross salary.
    #[serde(default)]
    pub percentage: Option<Decimal>,
    /// Cap applied to a percentage deduction.
    #[serde(default)]
    pub max_limit: Option<Decimal>,
}

impl StandardDeduction {
    /// A fixed-amount deduction.
    pub fn fixed(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            percentage: None,
            max_limit: None,
        }
    }

    /// A percentage-of-gross deduction with an optional cap.
    pub fn percentage(
        name: impl Into<String>,
        percentage: Decimal,
        max_limit: Option<Decimal>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: None,
            percentage: Some(percentage),
            max_limit,
        }
    }
}

/// A mandatory contribution split between employee and employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryContribution {
    /// Display name of the contribution (e.g., "Provident Fund").
    pub name: String,
    /// Rate withheld from the employee.
    pub employee_rate: Decimal,
    /// Rate paid by the employer on top of gross.
    pub employer_rate: Decimal,
    /// Cap on the salary the rates apply to.
    #[serde(default)]
    pub max_contribution_base: Option<Decimal>,
}

impl StatutoryContribution {
    /// Creates a contribution.
    pub fn new(
        name: impl Into<String>,
        employee_rate: Decimal,
        employer_rate: Decimal,
        max_contribution_base: Option<Decimal>,
    ) -> Self {
        Self {
            name: name.into(),
            employee_rate,
            employer_rate,
            max_contribution_base,
        }
    }
}

/// The complete tax configuration for one country.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{BracketPeriod, TaxBracket, TaxRule};
/// use rust_decimal_macros::dec;
///
/// let rule = TaxRule {
///     country: "Testland".to_string(),
///     version: "2025".to_string(),
///     bracket_period: BracketPeriod::Monthly,
///     tax_brackets: vec![
///         TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0)),
///         TaxBracket::new(dec!(1001), None, dec!(0.2)),
///     ],
///     standard_deductions: vec![],
///     statutory_contributions: vec![],
/// };
/// assert!(rule.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRule {
    /// The country this rule applies to.
    pub country: String,
    /// Version label of the schedule.
    pub version: String,
    /// The period bracket thresholds are expressed in.
    #[serde(default)]
    pub bracket_period: BracketPeriod,
    /// Brackets ordered ascending by `min`.
    pub tax_brackets: Vec<TaxBracket>,
    /// Standard deductions applied before tax.
    #[serde(default)]
    pub standard_deductions: Vec<StandardDeduction>,
    /// Statutory contributions.
    #[serde(default)]
    pub statutory_contributions: Vec<StatutoryContribution>,
}

/// A partial update to a [`TaxRule`]. Fields left as `None` are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRulePatch {
    /// Replacement version label.
    #[serde(default)]
    pub version: Option<String>,
    /// Replacement bracket period.
    #[serde(default)]
    pub bracket_period: Option<BracketPeriod>,
    /// Replacement brackets.
    #[serde(default)]
    pub tax_brackets: Option<Vec<TaxBracket>>,
    /// Replacement standard deductions.
    #[serde(default)]
    pub standard_deductions: Option<Vec<StandardDeduction>>,
    /// Replacement statutory contributions.
    #[serde(default)]
    pub statutory_contributions: Option<Vec<StatutoryContribution>>,
}

impl TaxRule {
    /// Returns a copy of this rule with the patch merged over it.
    pub fn merged(&self, patch: TaxRulePatch) -> TaxRule {
        TaxRule {
            country: self.country.clone(),
            version: patch.version.unwrap_or_else(|| self.version.clone()),
            bracket_period: patch.bracket_period.unwrap_or(self.bracket_period),
            tax_brackets: patch
                .tax_brackets
                .unwrap_or_else(|| self.tax_brackets.clone()),
            standard_deductions: patch
                .standard_deductions
                .unwrap_or_else(|| self.standard_deductions.clone()),
            statutory_contributions: patch
                .statutory_contributions
                .unwrap_or_else(|| self.statutory_contributions.clone()),
        }
    }

    /// Checks the bracket, deduction and contribution invariants.
    ///
    /// Brackets must start at zero, be sorted, and be contiguous: each
    /// bracket starts either exactly at the previous `max` or one unit above
    /// it. Only the last bracket may be open-ended.
    pub fn validate(&self) -> PayrollResult<()> {
        self.validate_brackets()?;
        self.validate_deductions()?;
        self.validate_contributions()
    }

    fn invalid(&self, message: impl Into<String>) -> PayrollError {
        PayrollError::InvalidTaxRule {
            country: self.country.clone(),
            message: message.into(),
        }
    }

    fn validate_brackets(&self) -> PayrollResult<()> {
        let brackets = &self.tax_brackets;
        let first = brackets
            .first()
            .ok_or_else(|| self.invalid("at least one tax bracket is required"))?;

        if first.min != Decimal::ZERO {
            return Err(self.invalid(format!(
                "first bracket must start at 0, found {}",
                first.min
            )));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if !is_rate(bracket.rate) {
                return Err(self.invalid(format!(
                    "bracket {} rate {} is outside [0, 1]",
                    index, bracket.rate
                )));
            }

            let is_last = index + 1 == brackets.len();
            match (bracket.max, is_last) {
                (None, false) => {
                    return Err(self.invalid(format!(
                        "bracket {} is open-ended but is not the last bracket",
                        index
                    )));
                }
                (Some(_), true) => {
                    return Err(self.invalid("the last bracket must be open-ended"));
                }
                (Some(max), false) if max < bracket.min => {
                    return Err(self.invalid(format!(
                        "bracket {} max {} is below its min {}",
                        index, max, bracket.min
                    )));
                }
                _ => {}
            }
        }

        for (index, pair) in brackets.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            // Open-ended brackets other than the last were rejected above.
            let Some(max) = current.max else { continue };

            if next.min != max && next.min != max + Decimal::ONE {
                let problem = if next.min < max { "overlaps" } else { "leaves a gap after" };
                return Err(self.invalid(format!(
                    "bracket {} (min {}) {} bracket {} (max {})",
                    index + 1,
                    next.min,
                    problem,
                    index,
                    max
                )));
            }
        }

        Ok(())
    }

    fn validate_deductions(&self) -> PayrollResult<()> {
        for deduction in &self.standard_deductions {
            match (deduction.amount, deduction.percentage) {
                (Some(amount), None) => {
                    if amount < Decimal::ZERO {
                        return Err(self.invalid(format!(
                            "deduction '{}' amount must not be negative",
                            deduction.name
                        )));
                    }
                }
                (None, Some(percentage)) => {
                    if !is_rate(percentage) {
                        return Err(self.invalid(format!(
                            "deduction '{}' percentage {} is outside [0, 1]",
                            deduction.name, percentage
                        )));
                    }
                }
                _ => {
                    return Err(self.invalid(format!(
                        "deduction '{}' must set exactly one of amount or percentage",
                        deduction.name
                    )));
                }
            }

            if deduction.max_limit.is_some_and(|limit| limit < Decimal::ZERO) {
                return Err(self.invalid(format!(
                    "deduction '{}' max_limit must not be negative",
                    deduction.name
                )));
            }
        }
        Ok(())
    }

    fn validate_contributions(&self) -> PayrollResult<()> {
        for contribution in &self.statutory_contributions {
            if !is_rate(contribution.employee_rate) || !is_rate(contribution.employer_rate) {
                return Err(self.invalid(format!(
                    "contribution '{}' rates must be within [0, 1]",
                    contribution.name
                )));
            }
            if contribution
                .max_contribution_base
                .is_some_and(|base| base <= Decimal::ZERO)
            {
                return Err(self.invalid(format!(
                    "contribution '{}' max_contribution_base must be positive",
                    contribution.name
                )));
            }
        }
        Ok(())
    }
}

fn is_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
