//! Compliance checking.
//!
//! The [`ComplianceChecker`] runs a list of registered [`ComplianceRule`]s
//! against a computed payroll. Findings are data attached to the record;
//! a failed check never prevents the record from being created.

mod rules;

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::models::{AuditStep, ComplianceCheck, ComplianceStatus};

pub use rules::{ComplianceInput, ComplianceRule, MinimumWageRule, StatutoryDeductionsRule};

/// Rule id recorded for compliance steps.
pub const COMPLIANCE_RULE_ID: &str = "compliance";

/// Runs compliance rules independently of each other.
#[derive(Clone, Default)]
pub struct ComplianceChecker {
    rules: Vec<Arc<dyn ComplianceRule>>,
}

impl fmt::Debug for ComplianceChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplianceChecker")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ComplianceChecker {
    /// Creates a checker with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a checker with the built-in minimum wage and statutory rules.
    pub fn with_builtin_rules() -> Self {
        let mut checker = Self::new();
        checker.register(Arc::new(MinimumWageRule::builtin()));
        checker.register(Arc::new(StatutoryDeductionsRule));
        checker
    }

    /// Appends a rule. Rules run in registration order.
    pub fn register(&mut self, rule: Arc<dyn ComplianceRule>) {
        self.rules.push(rule);
    }

    /// Runs every rule and collects the findings of those that apply.
    pub fn run(&self, input: &ComplianceInput<'_>) -> Vec<ComplianceCheck> {
        let checks: Vec<ComplianceCheck> = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(input))
            .collect();

        for check in checks.iter().filter(|c| c.status != ComplianceStatus::Passed) {
            warn!(
                country = %input.country,
                check = %check.name,
                status = ?check.status,
                message = %check.message,
                "Compliance check did not pass"
            );
        }

        checks
    }

    /// Runs every rule and records an audit step.
    pub fn run_with_audit(
        &self,
        input: &ComplianceInput<'_>,
        step_number: u32,
    ) -> (Vec<ComplianceCheck>, AuditStep) {
        let checks = self.run(input);
        let failed = checks
            .iter()
            .filter(|c| c.status == ComplianceStatus::Failed)
            .count();

        let audit_step = AuditStep {
            step_number,
            rule_id: COMPLIANCE_RULE_ID.to_string(),
            rule_name: "Compliance Checks".to_string(),
            input: serde_json::json!({
                "country": input.country,
                "basic_salary": input.basic_salary.normalize().to_string(),
                "gross_salary": input.gross_salary.normalize().to_string()
            }),
            output: serde_json::json!({ "checks": checks }),
            reasoning: format!("{} checks run, {} failed", checks.len(), failed),
        };

        (checks, audit_step)
    }
}
