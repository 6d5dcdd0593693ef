//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine settings
//! and tax rule seeds from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{PayrollError, PayrollResult};
use crate::models::TaxRule;
use crate::tax_rules::TaxRuleRepository;

use super::types::PayrollSettings;

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── settings.yaml       # Engine settings (required)
/// └── tax_rules/          # Tax rule seeds (optional)
///     └── germany.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/default")?;
/// let repository = config.tax_rule_repository()?;
/// println!("Base currency: {}", config.settings().base_currency);
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: PayrollSettings,
    tax_rules: Vec<TaxRule>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `settings.yaml` is missing, if any file contains
    /// invalid YAML, or if any tax rule seed violates the rule invariants.
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PayrollSettings>(&path.join("settings.yaml"))?;
        settings.validate()?;

        let tax_rules = Self::load_tax_rules(&path.join("tax_rules"))?;

        debug!(
            path = %path.display(),
            tax_rules = tax_rules.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            settings,
            tax_rules,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every tax rule file in the directory, in file name order.
    ///
    /// A missing directory means no seeds.
    fn load_tax_rules(rules_dir: &Path) -> PayrollResult<Vec<TaxRule>> {
        if !rules_dir.exists() {
            return Ok(Vec::new());
        }

        let rules_dir_str = rules_dir.display().to_string();
        let entries = fs::read_dir(rules_dir).map_err(|_| PayrollError::ConfigNotFound {
            path: rules_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| PayrollError::ConfigNotFound {
                path: rules_dir_str.clone(),
            })?;
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(paths.len());
        for path in paths {
            let rule = Self::load_yaml::<TaxRule>(&path)?;
            rule.validate()?;
            if !seen.insert(rule.country.clone()) {
                return Err(duplicate_rule(&path, &rule.country));
            }
            rules.push(rule);
        }

        Ok(rules)
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Returns the tax rule seeds.
    pub fn tax_rules(&self) -> &[TaxRule] {
        &self.tax_rules
    }

    /// Builds a repository seeded with the loaded tax rules.
    pub fn tax_rule_repository(&self) -> PayrollResult<TaxRuleRepository> {
        TaxRuleRepository::with_rules(self.tax_rules.iter().cloned())
    }
}

fn duplicate_rule(path: &Path, country: &str) -> PayrollError {
    PayrollError::ConfigParseError {
        path: path.display().to_string(),
        message: format!("tax rule for '{}' is defined more than once", country),
    }
}
