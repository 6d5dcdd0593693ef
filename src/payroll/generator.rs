//! Payroll generation and lifecycle.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::round_money;
use crate::compensation::CompensationComposer;
use crate::compliance::ComplianceChecker;
use crate::config::PayrollSettings;
use crate::countries::currency_for;
use crate::currency::{CurrencyConverter, ExchangeRate};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    AuditStep, AuditTrace, BankDetails, Employee, PayPeriod, PaymentDetails, PaymentMethod,
    PayrollRecord, PayrollStatus, RecordKey, TaxRule,
};
use crate::tax_rules::TaxRuleRepository;

use super::computation::{MAX_BASIC_SALARY, PayrollInputs, compute_payroll};
use super::directory::{EmployeeDirectory, EmployeeFilter};
use super::store::{PayrollStore, RecordPatch};

/// The engine version stamped on every record.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One employee a bulk run could not generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    /// The employee.
    pub employee_id: String,
    /// Why generation failed.
    pub error: String,
}

/// The outcome of a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGenerationSummary {
    /// Number of records created.
    pub created: usize,
    /// Employees that already had a record.
    pub skipped: usize,
    /// Employees whose generation failed.
    pub failures: Vec<BulkFailure>,
    /// Ids of the created records.
    pub record_ids: Vec<Uuid>,
}

enum BulkOutcome {
    Created(Uuid),
    Skipped,
}

/// Generates payroll records and moves them through their lifecycle.
///
/// Cloning is cheap; every collaborator is shared.
#[derive(Clone)]
pub struct PayrollGenerator {
    pub(super) directory: Arc<dyn EmployeeDirectory>,
    pub(super) store: Arc<dyn PayrollStore>,
    pub(super) tax_rules: Arc<TaxRuleRepository>,
    pub(super) converter: Arc<CurrencyConverter>,
    pub(super) composer: Arc<CompensationComposer>,
    pub(super) compliance: Arc<ComplianceChecker>,
    pub(super) settings: Arc<PayrollSettings>,
}

impl std::fmt::Debug for PayrollGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayrollGenerator")
            .field("converter", &self.converter)
            .field("composer", &self.composer)
            .field("compliance", &self.compliance)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PayrollGenerator {
    /// Creates a generator with the built-in allowance strategies and
    /// compliance rules.
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        store: Arc<dyn PayrollStore>,
        tax_rules: Arc<TaxRuleRepository>,
        converter: Arc<CurrencyConverter>,
        settings: PayrollSettings,
    ) -> Self {
        Self {
            directory,
            store,
            tax_rules,
            converter,
            composer: Arc::new(CompensationComposer::with_builtin_strategies(
                settings.performance_bonus_rate,
            )),
            compliance: Arc::new(ComplianceChecker::with_builtin_rules()),
            settings: Arc::new(settings),
        }
    }

    /// Replaces the allowance strategies.
    pub fn with_composer(mut self, composer: CompensationComposer) -> Self {
        self.composer = Arc::new(composer);
        self
    }

    /// Replaces the compliance rules.
    pub fn with_compliance(mut self, compliance: ComplianceChecker) -> Self {
        self.compliance = Arc::new(compliance);
        self
    }

    /// The tax rule repository the generator reads.
    pub fn tax_rules(&self) -> &TaxRuleRepository {
        &self.tax_rules
    }

    /// Generates the draft payroll of one employee for one country and month.
    ///
    /// Fails with [`PayrollError::DuplicateRecord`] if a record already
    /// exists for the employee, country and period.
    pub async fn generate(
        &self,
        tenant_id: &str,
        employee_id: &str,
        country: &str,
        period: PayPeriod,
    ) -> PayrollResult<PayrollRecord> {
        validate_request(tenant_id, country, period)?;
        require_non_empty("employee_id", employee_id)?;

        let employee = self
            .directory
            .get_employee(tenant_id, employee_id)
            .await?
            .ok_or_else(|| PayrollError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;

        let key = RecordKey::new(tenant_id, employee_id, country, period);
        if self.store.find_by_key(&key).await?.is_some() {
            return Err(duplicate(&key));
        }

        check_employee(&employee)?;
        let rule = self.tax_rules.get(country).await;
        let rates = SalaryRates {
            payroll: self.converter.rate(currency_for(country)).await?,
            salary: self.converter.rate(&employee.currency).await?,
        };

        let record = self.build_record(&employee, country, period, &rule, &rates)?;
        let record = self.store.insert(record).await?;

        info!(
            tenant_id = %tenant_id,
            employee_id = %employee_id,
            country = %country,
            period = %period,
            record_id = %record.id,
            net_salary = %record.net_salary,
            currency = %record.currency,
            "Generated payroll record"
        );

        Ok(record)
    }

    /// Generates draft payrolls for every active employee matching `filter`.
    ///
    /// Employees that already have a record are skipped. Each employee is
    /// generated on its own task and a failure only affects that employee.
    /// The tax rule and every exchange rate are resolved once for the batch,
    /// so all records of one run use the same rates.
    pub async fn generate_bulk(
        &self,
        tenant_id: &str,
        country: &str,
        period: PayPeriod,
        filter: &EmployeeFilter,
    ) -> PayrollResult<BulkGenerationSummary> {
        validate_request(tenant_id, country, period)?;

        let employees = self.directory.list_active_employees(tenant_id, filter).await?;
        let rule = Arc::new(self.tax_rules.get(country).await);
        let rate = Arc::new(self.converter.rate(currency_for(country)).await?);
        let salary_rates = Arc::new(self.salary_rates(tenant_id, &employees).await);

        let mut pending: HashSet<String> = employees.iter().map(|e| e.id.clone()).collect();
        let mut tasks = JoinSet::new();

        for employee in employees {
            let generator = self.clone();
            let country = country.to_string();
            let rule = Arc::clone(&rule);
            let rate = Arc::clone(&rate);
            let salary_rates = Arc::clone(&salary_rates);

            tasks.spawn(async move {
                let outcome = generator
                    .generate_for_batch(&employee, &country, period, &rule, &rate, &salary_rates)
                    .await;
                (employee.id, outcome)
            });
        }

        let mut summary = BulkGenerationSummary::default();
        while let Some(joined) = tasks.join_next().await {
            let (employee_id, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!(tenant_id = %tenant_id, error = %e, "Bulk payroll task did not complete");
                    continue;
                }
            };
            pending.remove(&employee_id);

            match outcome {
                Ok(BulkOutcome::Created(id)) => {
                    summary.created += 1;
                    summary.record_ids.push(id);
                }
                Ok(BulkOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        employee_id = %employee_id,
                        error = %e,
                        "Bulk payroll generation failed for employee"
                    );
                    summary.failures.push(BulkFailure {
                        employee_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut lost: Vec<String> = pending.into_iter().collect();
        lost.sort();
        summary.failures.extend(lost.into_iter().map(|employee_id| BulkFailure {
            employee_id,
            error: "generation task did not complete".to_string(),
        }));
        summary.failures.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        info!(
            tenant_id = %tenant_id,
            country = %country,
            period = %period,
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "Bulk payroll generation finished"
        );

        Ok(summary)
    }

    /// Resolves the rate of every salary currency in the batch.
    ///
    /// A currency without a rate is left out; its employees fail individually.
    async fn salary_rates(
        &self,
        tenant_id: &str,
        employees: &[Employee],
    ) -> HashMap<String, ExchangeRate> {
        let currencies: HashSet<&str> = employees.iter().map(|e| e.currency.as_str()).collect();
        let mut rates = HashMap::with_capacity(currencies.len());

        for currency in currencies {
            match self.converter.rate(currency).await {
                Ok(rate) => {
                    rates.insert(currency.to_string(), rate);
                }
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        currency = %currency,
                        error = %e,
                        "No exchange rate for salary currency"
                    );
                }
            }
        }
        rates
    }

    async fn generate_for_batch(
        &self,
        employee: &Employee,
        country: &str,
        period: PayPeriod,
        rule: &TaxRule,
        rate: &ExchangeRate,
        salary_rates: &HashMap<String, ExchangeRate>,
    ) -> PayrollResult<BulkOutcome> {
        let key = RecordKey::new(employee.tenant_id.clone(), employee.id.clone(), country, period);
        if self.store.find_by_key(&key).await?.is_some() {
            return Ok(BulkOutcome::Skipped);
        }

        check_employee(employee)?;
        let salary = salary_rates.get(&employee.currency).cloned().ok_or_else(|| {
            PayrollError::validation(
                "currency",
                format!("no exchange rate available for '{}'", employee.currency),
            )
        })?;
        let rates = SalaryRates {
            payroll: rate.clone(),
            salary,
        };

        let record = self.build_record(employee, country, period, rule, &rates)?;
        match self.store.insert(record).await {
            Ok(record) => Ok(BulkOutcome::Created(record.id)),
            // Another writer created the record after the check above.
            Err(PayrollError::DuplicateRecord { .. }) => Ok(BulkOutcome::Skipped),
            Err(e) => Err(e),
        }
    }

    /// Converts the employee's salary and computes a draft record.
    fn build_record(
        &self,
        employee: &Employee,
        country: &str,
        period: PayPeriod,
        rule: &TaxRule,
        rates: &SalaryRates,
    ) -> PayrollResult<PayrollRecord> {
        let started = Instant::now();
        let rate = &rates.payroll;

        let basic_salary = round_money(CurrencyConverter::convert_with(
            employee.base_salary,
            &rates.salary,
            rate,
        )?);
        if basic_salary > MAX_BASIC_SALARY {
            return Err(PayrollError::validation(
                "base_salary",
                format!(
                    "employee '{}' has a basic salary of {} {}, above the supported maximum of {}",
                    employee.id, basic_salary, rate.currency, MAX_BASIC_SALARY
                ),
            ));
        }

        let mut trace = AuditTrace::default();
        trace.push(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "salary_conversion".to_string(),
            rule_name: "Salary Conversion".to_string(),
            input: serde_json::json!({
                "base_salary": employee.base_salary.normalize().to_string(),
                "from_currency": employee.currency,
                "to_currency": rate.currency,
                "salary_currency_rate": rates.salary.rate.normalize().to_string(),
                "exchange_rate": rate.rate.normalize().to_string(),
                "rate_source": rate.source
            }),
            output: serde_json::json!({ "basic_salary": basic_salary.normalize().to_string() }),
            reasoning: format!(
                "{} {} = {} {}",
                employee.base_salary.normalize(),
                employee.currency,
                basic_salary.normalize(),
                rate.currency
            ),
        });

        let inputs = PayrollInputs {
            country,
            currency: &rate.currency,
            basic_salary,
            rule,
        };
        let mut computed = compute_payroll(&inputs, &self.composer, &self.compliance, trace);
        computed.audit_trace.duration_us = started.elapsed().as_micros() as u64;

        let now = Utc::now();
        Ok(PayrollRecord {
            id: Uuid::new_v4(),
            tenant_id: employee.tenant_id.clone(),
            employee_id: employee.id.clone(),
            period,
            country: country.to_string(),
            currency: rate.currency.clone(),
            exchange_rate: rate.rate,
            exchange_rate_source: rate.source,
            basic_salary,
            allowances: computed.allowances,
            standard_deductions: computed.standard_deductions,
            statutory_deductions: computed.statutory_deductions,
            employer_contributions: computed.employer_contributions,
            gross_salary: computed.gross_salary,
            taxable_income: computed.taxable_income,
            tax: computed.tax,
            net_salary: computed.net_salary,
            total_employer_cost: computed.total_employer_cost,
            compliance_checks: computed.compliance_checks,
            status: PayrollStatus::Draft,
            payment: None,
            audit_trace: computed.audit_trace,
            engine_version: ENGINE_VERSION.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves a draft record to `processed`. Amounts are not recomputed.
    pub async fn process(&self, tenant_id: &str, id: Uuid) -> PayrollResult<PayrollRecord> {
        self.transition(tenant_id, id, PayrollStatus::Processed, None).await
    }

    /// Moves a processed record to `paid`, recording the payment.
    ///
    /// The method defaults to bank transfer.
    pub async fn mark_paid(
        &self,
        tenant_id: &str,
        id: Uuid,
        payment_date: NaiveDate,
        method: Option<PaymentMethod>,
        bank_details: Option<BankDetails>,
    ) -> PayrollResult<PayrollRecord> {
        let payment = PaymentDetails {
            payment_date,
            method: method.unwrap_or_default(),
            bank_details,
        };
        self.transition(tenant_id, id, PayrollStatus::Paid, Some(payment))
            .await
    }

    /// Cancels a draft or processed record.
    pub async fn cancel(&self, tenant_id: &str, id: Uuid) -> PayrollResult<PayrollRecord> {
        self.transition(tenant_id, id, PayrollStatus::Cancelled, None).await
    }

    async fn transition(
        &self,
        tenant_id: &str,
        id: Uuid,
        to: PayrollStatus,
        payment: Option<PaymentDetails>,
    ) -> PayrollResult<PayrollRecord> {
        let record = self
            .store
            .get(tenant_id, id)
            .await?
            .ok_or(PayrollError::RecordNotFound { record_id: id })?;

        if !record.status.can_transition_to(to) {
            return Err(PayrollError::InvalidTransition {
                record_id: id,
                from: record.status,
                to,
            });
        }

        let patch = RecordPatch {
            expected_status: record.status,
            status: to,
            payment,
        };
        let updated = self.store.update(tenant_id, id, patch).await?;

        info!(
            tenant_id = %tenant_id,
            record_id = %id,
            from = %record.status,
            to = %to,
            "Payroll record status changed"
        );

        Ok(updated)
    }
}

/// The rates one record is converted with.
struct SalaryRates {
    /// Rate of the payroll currency.
    payroll: ExchangeRate,
    /// Rate of the employee's salary currency.
    salary: ExchangeRate,
}

fn check_employee(employee: &Employee) -> PayrollResult<()> {
    if !employee.active {
        return Err(PayrollError::validation(
            "employee_id",
            format!("employee '{}' is not active", employee.id),
        ));
    }
    if employee.base_salary < Decimal::ZERO {
        return Err(PayrollError::validation(
            "base_salary",
            format!("employee '{}' has a negative base salary", employee.id),
        ));
    }
    Ok(())
}

fn validate_request(tenant_id: &str, country: &str, period: PayPeriod) -> PayrollResult<()> {
    require_non_empty("tenant_id", tenant_id)?;
    require_non_empty("country", country)?;
    period.validate()
}

fn require_non_empty(field: &str, value: &str) -> PayrollResult<()> {
    if value.trim().is_empty() {
        Err(PayrollError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn duplicate(key: &RecordKey) -> PayrollError {
    PayrollError::DuplicateRecord {
        employee_id: key.employee_id.clone(),
        country: key.country.clone(),
        month: key.period.month,
        year: key.period.year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::UnavailableRateSource;
    use crate::models::RateOrigin;
    use crate::currency::RateSource;
    use crate::payroll::{InMemoryEmployeeDirectory, InMemoryPayrollStore};
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(id: &str, salary: &str, currency: &str) -> Employee {
        Employee {
            id: id.to_string(),
            tenant_id: "acme".to_string(),
            name: id.to_string(),
            base_salary: dec(salary),
            currency: currency.to_string(),
            country: "India".to_string(),
            department: None,
            active: true,
        }
    }

    fn generator(employees: Vec<Employee>) -> PayrollGenerator {
        let settings = PayrollSettings::default();
        PayrollGenerator::new(
            Arc::new(InMemoryEmployeeDirectory::with_employees(employees)),
            Arc::new(InMemoryPayrollStore::new()),
            Arc::new(TaxRuleRepository::new()),
            Arc::new(CurrencyConverter::new(Arc::new(UnavailableRateSource), &settings)),
            settings,
        )
    }

    fn period() -> PayPeriod {
        PayPeriod::new(3, 2025).unwrap()
    }

    #[tokio::test]
    async fn test_generate_draft_record() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        assert_eq!(record.status, PayrollStatus::Draft);
        assert_eq!(record.currency, "INR");
        assert_eq!(record.exchange_rate, dec("83.12"));
        assert_eq!(record.exchange_rate_source, RateOrigin::Fallback);
        assert_eq!(record.basic_salary, dec("75000"));
        assert_eq!(record.net_salary, dec("97798.02"));
        assert_eq!(record.engine_version, ENGINE_VERSION);
        assert_eq!(record.audit_trace.steps[0].rule_id, "salary_conversion");
    }

    #[tokio::test]
    async fn test_salary_is_converted_into_payroll_currency() {
        let generator = generator(vec![employee("emp_001", "1000", "USD")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();
        assert_eq!(record.basic_salary, dec("83120"));
    }

    #[tokio::test]
    async fn test_unknown_employee() {
        let generator = generator(vec![]);
        assert!(matches!(
            generator.generate("acme", "ghost", "India", period()).await,
            Err(PayrollError::EmployeeNotFound { employee_id }) if employee_id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_invalid_period_rejected_before_lookup() {
        let generator = generator(vec![]);
        let period = PayPeriod { year: 2025, month: 13 };
        assert!(matches!(
            generator.generate("acme", "ghost", "India", period).await,
            Err(PayrollError::Validation { field, .. }) if field == "month"
        ));
    }

    #[tokio::test]
    async fn test_negative_salary_rejected() {
        let generator = generator(vec![employee("emp_001", "-1", "INR")]);
        assert!(matches!(
            generator.generate("acme", "emp_001", "India", period()).await,
            Err(PayrollError::Validation { field, .. }) if field == "base_salary"
        ));
    }

    #[tokio::test]
    async fn test_inactive_employee_rejected() {
        let mut inactive = employee("emp_001", "75000", "INR");
        inactive.active = false;
        let generator = generator(vec![inactive]);
        assert!(generator.generate("acme", "emp_001", "India", period()).await.is_err());
    }

    #[tokio::test]
    async fn test_second_generation_is_duplicate() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        let error = generator
            .generate("acme", "emp_001", "India", period())
            .await
            .unwrap_err();
        assert!(error.is_business_outcome());
        assert!(matches!(error, PayrollError::DuplicateRecord { month: 3, year: 2025, .. }));
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        // Paying a draft skips processing.
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert!(matches!(
            generator.mark_paid("acme", record.id, date, None, None).await,
            Err(PayrollError::InvalidTransition {
                from: PayrollStatus::Draft,
                to: PayrollStatus::Paid,
                ..
            })
        ));

        let processed = generator.process("acme", record.id).await.unwrap();
        assert_eq!(processed.status, PayrollStatus::Processed);
        assert_eq!(processed.net_salary, record.net_salary);

        let paid = generator.mark_paid("acme", record.id, date, None, None).await.unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);
        let payment = paid.payment.unwrap();
        assert_eq!(payment.method, PaymentMethod::BankTransfer);
        assert_eq!(payment.payment_date, date);

        assert!(matches!(
            generator.cancel("acme", record.id).await,
            Err(PayrollError::InvalidTransition { from: PayrollStatus::Paid, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_from_draft() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        let cancelled = generator.cancel("acme", record.id).await.unwrap();
        assert_eq!(cancelled.status, PayrollStatus::Cancelled);
        assert!(generator.process("acme", record.id).await.is_err());
    }

    #[tokio::test]
    async fn test_transition_of_other_tenants_record_is_not_found() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        assert!(matches!(
            generator.process("globex", record.id).await,
            Err(PayrollError::RecordNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_process_calls_succeed_once() {
        let generator = generator(vec![employee("emp_001", "75000", "INR")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        let (first, second) = tokio::join!(
            generator.process("acme", record.id),
            generator.process("acme", record.id)
        );
        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn test_bulk_isolates_failures() {
        let generator = generator(vec![
            employee("emp_001", "75000", "INR"),
            employee("emp_002", "-5", "INR"),
            employee("emp_003", "90000", "XYZ"),
        ]);

        let summary = generator
            .generate_bulk("acme", "India", period(), &EmployeeFilter::all())
            .await
            .unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped, 0);
        let failed: Vec<&str> = summary.failures.iter().map(|f| f.employee_id.as_str()).collect();
        assert_eq!(failed, vec!["emp_002", "emp_003"]);
    }

    /// Counts fetches and never answers within any sensible timeout.
    struct StalledRateSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateSource for StalledRateSource {
        async fn fetch_rates(&self, _base: &str) -> PayrollResult<HashMap<String, Decimal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(HashMap::new())
        }
    }

    #[tokio::test]
    async fn test_bulk_fetches_rates_once_while_source_is_down() {
        let source = Arc::new(StalledRateSource {
            calls: AtomicUsize::new(0),
        });
        let settings = PayrollSettings {
            rate_fetch_timeout_ms: 50,
            ..Default::default()
        };
        let employees = (0..10).map(|n| employee(&format!("emp_{:03}", n), "1000", "USD"));
        let generator = PayrollGenerator::new(
            Arc::new(InMemoryEmployeeDirectory::with_employees(employees)),
            Arc::new(InMemoryPayrollStore::new()),
            Arc::new(TaxRuleRepository::new()),
            Arc::new(CurrencyConverter::new(source.clone(), &settings)),
            settings,
        );

        let started = std::time::Instant::now();
        let summary = generator
            .generate_bulk("acme", "India", period(), &EmployeeFilter::all())
            .await
            .unwrap();

        assert_eq!(summary.created, 10);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(2));

        // Later single generations reuse the cached failure as well.
        generator
            .generate("acme", "emp_000", "US", period())
            .await
            .unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_record_stores_the_rate_it_was_converted_with() {
        let generator = generator(vec![employee("emp_001", "1000", "USD")]);
        let record = generator.generate("acme", "emp_001", "India", period()).await.unwrap();

        assert_eq!(record.basic_salary, dec("1000") * record.exchange_rate);
        let conversion = record.audit_trace.step("salary_conversion").unwrap();
        assert_eq!(conversion.input["exchange_rate"], "83.12");
        assert_eq!(conversion.input["salary_currency_rate"], "1");
    }

    #[tokio::test]
    async fn test_salary_above_supported_maximum_is_rejected() {
        let capped = generator(vec![
            employee("emp_001", "10000000000000", "INR"),
            employee("emp_002", "70000000000000000000000000000", "INR"),
            employee("emp_003", "70000000000000000000000000000", "USD"),
        ]);

        for id in ["emp_001", "emp_002"] {
            assert!(matches!(
                capped.generate("acme", id, "India", period()).await,
                Err(PayrollError::Validation { field, .. }) if field == "base_salary"
            ));
        }

        // Converting a huge salary into a weaker currency overflows instead.
        assert!(matches!(
            capped.generate("acme", "emp_003", "India", period()).await,
            Err(PayrollError::Validation { field, .. }) if field == "amount"
        ));
    }
}
