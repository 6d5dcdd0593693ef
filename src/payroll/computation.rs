//! The pure arithmetic of one payroll.
//!
//! [`compute_payroll`] runs every calculation for an already-converted basic
//! salary. It does no I/O, so it is shared by single and bulk generation
//! and is benchmarked directly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculation::{
    calculate_employee_contributions, calculate_employer_contributions, calculate_period_tax,
    calculate_standard_deductions,
};
use crate::compensation::CompensationComposer;
use crate::compliance::{ComplianceChecker, ComplianceInput};
use crate::models::{AuditStep, AuditTrace, ComplianceCheck, PayrollComponent, TaxRule};

/// Largest monthly basic salary, in payroll currency, the engine computes.
///
/// Keeps annualized tax and contribution arithmetic far below the range of
/// [`Decimal`].
pub const MAX_BASIC_SALARY: Decimal = dec!(1000000000000);

/// What a payroll is computed from.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInputs<'a> {
    /// Payroll country.
    pub country: &'a str,
    /// Payroll currency.
    pub currency: &'a str,
    /// Basic monthly salary in `currency`.
    pub basic_salary: Decimal,
    /// The country's tax rule.
    pub rule: &'a TaxRule,
}

/// Every computed amount of one payroll.
#[derive(Debug, Clone)]
pub struct PayrollComputation {
    /// Allowances, performance bonus last.
    pub allowances: Vec<PayrollComponent>,
    /// Basic salary plus allowances.
    pub gross_salary: Decimal,
    /// Total standard deductions.
    pub standard_deductions: Decimal,
    /// Gross less standard deductions, floored at zero.
    pub taxable_income: Decimal,
    /// Monthly income tax.
    pub tax: Decimal,
    /// Employee statutory deductions.
    pub statutory_deductions: Vec<PayrollComponent>,
    /// Sum of the employee statutory deductions.
    pub statutory_total: Decimal,
    /// Employer statutory contributions.
    pub employer_contributions: Vec<PayrollComponent>,
    /// Gross less tax less employee statutory deductions.
    pub net_salary: Decimal,
    /// Gross plus employer contributions.
    pub total_employer_cost: Decimal,
    /// Compliance findings.
    pub compliance_checks: Vec<ComplianceCheck>,
    /// The trace passed in, extended with one step per calculation.
    pub audit_trace: AuditTrace,
}

/// Computes a payroll, appending its steps to `audit_trace`.
///
/// `inputs.basic_salary` is expected to be within `0..=MAX_BASIC_SALARY`.
pub fn compute_payroll(
    inputs: &PayrollInputs<'_>,
    composer: &CompensationComposer,
    compliance: &ComplianceChecker,
    mut audit_trace: AuditTrace,
) -> PayrollComputation {
    let rule = inputs.rule;
    let basic_salary = inputs.basic_salary;

    let compensation =
        composer.compose(basic_salary, inputs.country, audit_trace.next_step_number());
    audit_trace.push(compensation.audit_step);
    let allowances = compensation.allowances;

    let gross_salary = basic_salary + compensation.total;
    audit_trace.push(AuditStep {
        step_number: audit_trace.next_step_number(),
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "allowances_total": compensation.total.normalize().to_string()
        }),
        output: serde_json::json!({ "gross_salary": gross_salary.normalize().to_string() }),
        reasoning: format!(
            "Basic {} + allowances {} = {}",
            basic_salary.normalize(),
            compensation.total.normalize(),
            gross_salary.normalize()
        ),
    });

    let deductions = calculate_standard_deductions(
        gross_salary,
        &rule.standard_deductions,
        audit_trace.next_step_number(),
    );
    audit_trace.push(deductions.audit_step);

    let taxable_income = (gross_salary - deductions.total).max(Decimal::ZERO);
    audit_trace.push(AuditStep {
        step_number: audit_trace.next_step_number(),
        rule_id: "taxable_income".to_string(),
        rule_name: "Taxable Income".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "standard_deductions": deductions.total.normalize().to_string()
        }),
        output: serde_json::json!({ "taxable_income": taxable_income.normalize().to_string() }),
        reasoning: format!(
            "max(0, {} - {}) = {}",
            gross_salary.normalize(),
            deductions.total.normalize(),
            taxable_income.normalize()
        ),
    });

    let tax = calculate_period_tax(taxable_income, rule, audit_trace.next_step_number());
    audit_trace.push(tax.audit_step);

    let employee = calculate_employee_contributions(
        gross_salary,
        &rule.statutory_contributions,
        audit_trace.next_step_number(),
    );
    audit_trace.push(employee.audit_step);

    let employer = calculate_employer_contributions(
        gross_salary,
        &rule.statutory_contributions,
        audit_trace.next_step_number(),
    );
    audit_trace.push(employer.audit_step);

    let net_salary = gross_salary - tax.tax - employee.total;
    let total_employer_cost = gross_salary + employer.total;
    audit_trace.push(AuditStep {
        step_number: audit_trace.next_step_number(),
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary and Employer Cost".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "tax": tax.tax.normalize().to_string(),
            "employee_statutory": employee.total.normalize().to_string(),
            "employer_statutory": employer.total.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.normalize().to_string(),
            "total_employer_cost": total_employer_cost.normalize().to_string()
        }),
        reasoning: format!(
            "Net {} - {} - {} = {}; employer cost {} + {} = {}",
            gross_salary.normalize(),
            tax.tax.normalize(),
            employee.total.normalize(),
            net_salary.normalize(),
            gross_salary.normalize(),
            employer.total.normalize(),
            total_employer_cost.normalize()
        ),
    });

    let compliance_input = ComplianceInput {
        country: inputs.country,
        currency: inputs.currency,
        basic_salary,
        gross_salary,
        statutory_deductions: &employee.items,
        employer_contributions: &employer.items,
    };
    let (compliance_checks, compliance_step) =
        compliance.run_with_audit(&compliance_input, audit_trace.next_step_number());
    audit_trace.push(compliance_step);

    PayrollComputation {
        allowances,
        gross_salary,
        standard_deductions: deductions.total,
        taxable_income,
        tax: tax.tax,
        statutory_deductions: employee.items,
        statutory_total: employee.total,
        employer_contributions: employer.items,
        net_salary,
        total_employer_cost,
        compliance_checks,
        audit_trace,
    }
}
