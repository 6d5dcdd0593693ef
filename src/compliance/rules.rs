//! Built-in compliance rules.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{ComplianceCheck, ComplianceStatus, PayrollComponent, total_amount};

/// The computed values compliance rules inspect.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceInput<'a> {
    /// Payroll country.
    pub country: &'a str,
    /// Payroll currency.
    pub currency: &'a str,
    /// Basic monthly salary.
    pub basic_salary: Decimal,
    /// Gross monthly salary.
    pub gross_salary: Decimal,
    /// Employee statutory deductions.
    pub statutory_deductions: &'a [PayrollComponent],
    /// Employer statutory contributions.
    pub employer_contributions: &'a [PayrollComponent],
}

/// A named policy check.
///
/// Rules are advisory: a failed check is reported on the record and never
/// blocks its creation.
pub trait ComplianceRule: Send + Sync {
    /// The check name reported on findings.
    fn name(&self) -> &str;

    /// Evaluates the rule. Returns `None` when the rule does not apply.
    fn check(&self, input: &ComplianceInput<'_>) -> Option<ComplianceCheck>;
}

/// Checks basic salary against a per-country monthly minimum wage.
#[derive(Debug, Clone, Default)]
pub struct MinimumWageRule {
    minimums: HashMap<String, Decimal>,
}

impl MinimumWageRule {
    /// Check name.
    pub const NAME: &'static str = "Minimum Wage Compliance";

    /// Creates a rule with no minimums.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in monthly minimums.
    ///
    /// Hourly rates are converted at a four-week month: US 7.25 x 40 x 4,
    /// UK 9.50 x 40 x 4, Australia 21.38 x 38 x 4. India and Singapore are
    /// set monthly.
    pub fn builtin() -> Self {
        Self::new()
            .with_minimum("US", dec!(1160))
            .with_minimum("UK", dec!(1520))
            .with_minimum("India", dec!(15000))
            .with_minimum("Singapore", dec!(1300))
            .with_minimum("Australia", dec!(3249.76))
    }

    /// Sets the monthly minimum for `country`.
    pub fn with_minimum(mut self, country: impl Into<String>, monthly_minimum: Decimal) -> Self {
        self.minimums.insert(country.into(), monthly_minimum);
        self
    }

    /// The monthly minimum for `country`, if one is registered.
    pub fn minimum_for(&self, country: &str) -> Option<Decimal> {
        self.minimums.get(country).copied()
    }
}

impl ComplianceRule for MinimumWageRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, input: &ComplianceInput<'_>) -> Option<ComplianceCheck> {
        let minimum = self.minimum_for(input.country)?;

        Some(if input.basic_salary >= minimum {
            ComplianceCheck::new(
                Self::NAME,
                ComplianceStatus::Passed,
                "Salary meets minimum wage requirements",
            )
        } else {
            ComplianceCheck::new(
                Self::NAME,
                ComplianceStatus::Failed,
                format!(
                    "Salary is below minimum wage: {} {} < {} {}",
                    input.basic_salary.normalize(),
                    input.currency,
                    minimum.normalize(),
                    input.currency
                ),
            )
        })
    }
}

/// Sanity-checks the statutory amounts.
///
/// Every amount must be non-negative and employee deductions must not
/// exceed gross salary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatutoryDeductionsRule;

impl StatutoryDeductionsRule {
    /// Check name.
    pub const NAME: &'static str = "Statutory Deductions";
}

impl ComplianceRule for StatutoryDeductionsRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, input: &ComplianceInput<'_>) -> Option<ComplianceCheck> {
        let negative = input
            .statutory_deductions
            .iter()
            .chain(input.employer_contributions)
            .find(|item| item.amount() < Decimal::ZERO);

        if let Some(item) = negative {
            return Some(ComplianceCheck::new(
                Self::NAME,
                ComplianceStatus::Failed,
                format!("{} has a negative amount", item.name()),
            ));
        }

        let employee_total = total_amount(input.statutory_deductions);
        Some(if employee_total > input.gross_salary {
            ComplianceCheck::new(
                Self::NAME,
                ComplianceStatus::Failed,
                format!(
                    "Statutory deductions {} exceed gross salary {}",
                    employee_total.normalize(),
                    input.gross_salary.normalize()
                ),
            )
        } else {
            ComplianceCheck::new(
                Self::NAME,
                ComplianceStatus::Passed,
                "Statutory deductions are correctly calculated",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input<'a>(
        country: &'a str,
        basic: &str,
        statutory: &'a [PayrollComponent],
    ) -> ComplianceInput<'a> {
        ComplianceInput {
            country,
            currency: "XXX",
            basic_salary: dec(basic),
            gross_salary: dec(basic),
            statutory_deductions: statutory,
            employer_contributions: &[],
        }
    }

    #[test]
    fn test_minimum_wage_passes_at_threshold() {
        let check = MinimumWageRule::builtin().check(&input("US", "1160", &[])).unwrap();
        assert_eq!(check.status, ComplianceStatus::Passed);
        assert_eq!(check.name, "Minimum Wage Compliance");
    }

    #[test]
    fn test_minimum_wage_fails_below_threshold() {
        let check = MinimumWageRule::builtin()
            .check(&input("Australia", "3249.75", &[]))
            .unwrap();
        assert_eq!(check.status, ComplianceStatus::Failed);
        assert!(check.message.contains("3249.76"));
    }

    #[test]
    fn test_no_minimum_wage_check_without_entry() {
        assert!(MinimumWageRule::builtin().check(&input("Atlantis", "1", &[])).is_none());
    }

    #[test]
    fn test_statutory_deductions_pass() {
        let items = vec![PayrollComponent::statutory("ESI", dec("157.50"), "esi")];
        let check = StatutoryDeductionsRule.check(&input("India", "1000", &items)).unwrap();
        assert_eq!(check.status, ComplianceStatus::Passed);
    }

    #[test]
    fn test_statutory_deductions_exceeding_gross_fail() {
        let items = vec![PayrollComponent::statutory("CPF", dec("1200"), "cpf")];
        let check = StatutoryDeductionsRule.check(&input("Singapore", "1000", &items)).unwrap();
        assert_eq!(check.status, ComplianceStatus::Failed);
    }

    #[test]
    fn test_negative_statutory_amount_fails() {
        let items = vec![PayrollComponent::statutory("Refund", dec("-1"), "refund")];
        let check = StatutoryDeductionsRule.check(&input("UK", "1000", &items)).unwrap();
        assert_eq!(check.status, ComplianceStatus::Failed);
        assert!(check.message.contains("Refund"));
    }
}
