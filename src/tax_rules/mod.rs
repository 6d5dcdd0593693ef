//! Per-country tax rule storage.
//!
//! The [`TaxRuleRepository`] holds one [`TaxRule`] per country. Looking up a
//! country with no stored rule synthesizes that country's built-in default
//! and stores it, so lookups never fail.

mod defaults;

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::PayrollResult;
use crate::models::{TaxRule, TaxRulePatch};

pub use defaults::{BUILTIN_RULE_COUNTRIES, DEFAULT_RULE_VERSION, default_tax_rule};

/// Stores and retrieves tax rules by country.
///
/// # Example
///
/// ```
/// use payroll_engine::tax_rules::TaxRuleRepository;
///
/// # #[tokio::main]
/// # async fn main() {
/// let repository = TaxRuleRepository::new();
/// let rule = repository.get("India").await;
/// assert_eq!(rule.tax_brackets.len(), 7);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TaxRuleRepository {
    rules: RwLock<HashMap<String, TaxRule>>,
}

impl TaxRuleRepository {
    /// Creates an empty repository. Every country starts on its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with `rules`, validating each one.
    pub fn with_rules(rules: impl IntoIterator<Item = TaxRule>) -> PayrollResult<Self> {
        let mut stored = HashMap::new();
        for rule in rules {
            rule.validate()?;
            stored.insert(rule.country.clone(), rule);
        }
        Ok(Self {
            rules: RwLock::new(stored),
        })
    }

    /// Returns the rule for `country`, synthesizing and storing the default
    /// when none exists.
    pub async fn get(&self, country: &str) -> TaxRule {
        if let Some(rule) = self.rules.read().await.get(country) {
            return rule.clone();
        }

        let mut rules = self.rules.write().await;
        rules
            .entry(country.to_string())
            .or_insert_with(|| {
                debug!(
                    country = %country,
                    version = DEFAULT_RULE_VERSION,
                    "Synthesized default tax rule"
                );
                default_tax_rule(country)
            })
            .clone()
    }

    /// Merges `patch` over the current rule for `country` and stores it.
    ///
    /// The stored rule is left untouched if the merged rule is invalid.
    pub async fn update(&self, country: &str, patch: TaxRulePatch) -> PayrollResult<TaxRule> {
        let mut rules = self.rules.write().await;
        let current = rules
            .get(country)
            .cloned()
            .unwrap_or_else(|| default_tax_rule(country));

        let updated = current.merged(patch);
        updated.validate()?;
        rules.insert(country.to_string(), updated.clone());

        info!(country = %country, version = %updated.version, "Updated tax rule");
        Ok(updated)
    }

    /// Lists the countries with a stored rule, sorted.
    pub async fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = self.rules.read().await.keys().cloned().collect();
        countries.sort();
        countries
    }
}
