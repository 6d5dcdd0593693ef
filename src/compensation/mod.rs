//! Compensation composition.
//!
//! The [`CompensationComposer`] looks up the allowance strategy registered
//! for a country, falls back to the default strategy, and always appends
//! the performance bonus.

mod strategy;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculation::round_money;
use crate::models::{AuditStep, PayrollComponent, total_amount};

pub use strategy::{AllowanceAmount, AllowanceLine, AllowanceSchedule, AllowanceStrategy};

/// Name of the bonus appended to every payroll.
pub const PERFORMANCE_BONUS: &str = "Performance Bonus";

/// Rule id recorded for allowance steps.
pub const ALLOWANCES_RULE_ID: &str = "allowances";

/// The allowance lines of one payroll with their audit step.
#[derive(Debug, Clone)]
pub struct CompensationResult {
    /// Allowances in strategy order, performance bonus last.
    pub allowances: Vec<PayrollComponent>,
    /// Sum of the allowances.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Builds allowances from a per-country strategy registry.
#[derive(Clone)]
pub struct CompensationComposer {
    strategies: HashMap<String, Arc<dyn AllowanceStrategy>>,
    default_strategy: Arc<dyn AllowanceStrategy>,
    performance_bonus_rate: Decimal,
}

impl fmt::Debug for CompensationComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut countries: Vec<&String> = self.strategies.keys().collect();
        countries.sort();
        f.debug_struct("CompensationComposer")
            .field("countries", &countries)
            .field("performance_bonus_rate", &self.performance_bonus_rate)
            .finish_non_exhaustive()
    }
}

impl CompensationComposer {
    /// Creates a composer with no country strategies.
    pub fn new(
        default_strategy: Arc<dyn AllowanceStrategy>,
        performance_bonus_rate: Decimal,
    ) -> Self {
        Self {
            strategies: HashMap::new(),
            default_strategy,
            performance_bonus_rate,
        }
    }

    /// Creates a composer with the built-in India, UK and Singapore
    /// strategies and the built-in default.
    pub fn with_builtin_strategies(performance_bonus_rate: Decimal) -> Self {
        let default_strategy = AllowanceSchedule::new()
            .share_of_basic("Housing Allowance", dec!(0.2), true)
            .fixed("Transport Allowance", dec!(200), false);

        let mut composer = Self::new(Arc::new(default_strategy), performance_bonus_rate);
        composer.register(
            "India",
            Arc::new(
                AllowanceSchedule::new()
                    .share_of_basic("House Rent Allowance", dec!(0.4), true)
                    .fixed("Transport Allowance", dec!(1600), false)
                    .fixed("Medical Allowance", dec!(1250), false),
            ),
        );
        composer.register(
            "UK",
            Arc::new(
                AllowanceSchedule::new()
                    .fixed("Car Allowance", dec!(500), true)
                    .fixed("Meal Allowance", dec!(200), false),
            ),
        );
        composer.register(
            "Singapore",
            Arc::new(
                AllowanceSchedule::new()
                    .fixed("Transport Allowance", dec!(300), true)
                    .fixed("Phone Allowance", dec!(100), false),
            ),
        );
        composer
    }

    /// Registers the strategy for `country`, returning the one it replaces.
    pub fn register(
        &mut self,
        country: impl Into<String>,
        strategy: Arc<dyn AllowanceStrategy>,
    ) -> Option<Arc<dyn AllowanceStrategy>> {
        self.strategies.insert(country.into(), strategy)
    }

    /// Returns true if `country` has its own strategy.
    pub fn has_strategy(&self, country: &str) -> bool {
        self.strategies.contains_key(country)
    }

    /// Builds the allowances for `basic_salary` in `country`.
    pub fn build(&self, basic_salary: Decimal, country: &str) -> Vec<PayrollComponent> {
        let strategy = self
            .strategies
            .get(country)
            .unwrap_or(&self.default_strategy);

        let mut allowances = strategy.allowances(basic_salary);
        allowances.push(PayrollComponent::allowance(
            PERFORMANCE_BONUS,
            round_money(basic_salary * self.performance_bonus_rate),
            true,
            false,
        ));
        allowances
    }

    /// Builds the allowances and records an audit step.
    pub fn compose(
        &self,
        basic_salary: Decimal,
        country: &str,
        step_number: u32,
    ) -> CompensationResult {
        let allowances = self.build(basic_salary, country);
        let total = total_amount(&allowances);

        let audit_step = AuditStep {
            step_number,
            rule_id: ALLOWANCES_RULE_ID.to_string(),
            rule_name: "Allowances".to_string(),
            input: serde_json::json!({
                "basic_salary": basic_salary.normalize().to_string(),
                "country": country,
                "strategy": if self.has_strategy(country) { country } else { "default" }
            }),
            output: serde_json::json!({
                "allowances": allowances,
                "total": total.normalize().to_string()
            }),
            reasoning: allowances
                .iter()
                .map(|a| format!("{} {}", a.name(), a.amount().normalize()))
                .collect::<Vec<_>>()
                .join(", "),
        };

        CompensationResult {
            allowances,
            total,
            audit_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn composer() -> CompensationComposer {
        CompensationComposer::with_builtin_strategies(dec("0.10"))
    }

    #[test]
    fn test_india_allowances() {
        let allowances = composer().build(dec("75000"), "India");
        let names: Vec<&str> = allowances.iter().map(|a| a.name()).collect();

        assert_eq!(
            names,
            vec![
                "House Rent Allowance",
                "Transport Allowance",
                "Medical Allowance",
                "Performance Bonus"
            ]
        );
        assert_eq!(allowances[0].amount(), dec("30000"));
        assert_eq!(allowances[3].amount(), dec("7500"));
        assert_eq!(total_amount(&allowances), dec("40350"));
    }

    #[test]
    fn test_performance_bonus_always_last_and_not_country_specific() {
        for country in ["India", "UK", "Singapore", "Atlantis"] {
            let allowances = composer().build(dec("1000"), country);
            let bonus = allowances.last().unwrap();
            assert_eq!(bonus.name(), PERFORMANCE_BONUS);
            assert!(bonus.taxable());
            assert!(!bonus.country_specific());
            assert_eq!(bonus.amount(), dec("100"));
        }
    }

    #[test]
    fn test_unknown_country_uses_default_strategy() {
        let allowances = composer().build(dec("5000"), "Atlantis");
        assert_eq!(allowances[0].name(), "Housing Allowance");
        assert_eq!(allowances[0].amount(), dec("1000"));
        assert_eq!(allowances[1].name(), "Transport Allowance");
        assert_eq!(allowances[1].amount(), dec("200"));
    }

    #[test]
    fn test_register_replaces_strategy() {
        let mut composer = composer();
        let previous = composer.register(
            "UK",
            Arc::new(|_basic: Decimal| {
                vec![PayrollComponent::allowance("London Weighting", dec("350"), true, true)]
            }),
        );
        assert!(previous.is_some());

        let allowances = composer.build(dec("3000"), "UK");
        assert_eq!(allowances[0].name(), "London Weighting");
        assert_eq!(allowances.len(), 2);
    }

    #[test]
    fn test_new_country_can_be_registered() {
        let mut composer = composer();
        assert!(!composer.has_strategy("Japan"));
        composer.register(
            "Japan",
            Arc::new(AllowanceSchedule::new().fixed("Commuting Allowance", dec("15000"), false)),
        );
        assert!(composer.has_strategy("Japan"));
        assert_eq!(composer.build(dec("300000"), "Japan")[0].amount(), dec("15000"));
    }

    #[test]
    fn test_compose_records_strategy_used() {
        let result = composer().compose(dec("5000"), "Atlantis", 2);
        assert_eq!(result.audit_step.step_number, 2);
        assert_eq!(result.audit_step.input["strategy"], "default");
        assert_eq!(result.total, dec("1700"));
    }
}
