//! Record lookup, listing and statistics.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::round_money;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{ComplianceStatus, PayPeriod, PayrollRecord, PayrollStatus};

use super::generator::PayrollGenerator;
use super::store::RecordFilter;

/// Which page of a listing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Page size. The configured default applies when unset.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: None }
    }
}

impl Pagination {
    /// A page with an explicit size.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit: Some(limit),
        }
    }
}

/// One page of records.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    /// The records on this page.
    pub records: Vec<PayrollRecord>,
    /// Number of records matching the filter.
    pub total: usize,
    /// The page number.
    pub page: u32,
    /// The page size used.
    pub limit: u32,
    /// Number of pages.
    pub pages: u32,
}

/// Narrows the records [`PayrollGenerator::get_stats`] aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFilter {
    /// Only records of this period.
    #[serde(default)]
    pub period: Option<PayPeriod>,
    /// Only records of this country.
    #[serde(default)]
    pub country: Option<String>,
}

/// Record counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Draft records.
    pub draft: usize,
    /// Processed records.
    pub processed: usize,
    /// Paid records.
    pub paid: usize,
    /// Cancelled records.
    pub cancelled: usize,
}

impl StatusCounts {
    fn add(&mut self, status: PayrollStatus) {
        match status {
            PayrollStatus::Draft => self.draft += 1,
            PayrollStatus::Processed => self.processed += 1,
            PayrollStatus::Paid => self.paid += 1,
            PayrollStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Compliance check outcomes across records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceStats {
    /// Passed checks.
    pub passed: usize,
    /// Failed checks.
    pub failed: usize,
    /// Checks with a warning.
    pub warning: usize,
}

/// Per-country totals in the country's own currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryBreakdown {
    /// The payroll country.
    pub country: String,
    /// The currency of the totals.
    pub currency: String,
    /// Number of records.
    pub count: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
}

/// Aggregate statistics of a tenant's payroll.
///
/// Money totals are in the base currency, converted with the exchange rate
/// stored on each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollStats {
    /// The currency of the money totals.
    pub base_currency: String,
    /// Active employees in the directory.
    pub total_employees: usize,
    /// Records matching the filter.
    pub processed_employees: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
    /// Sum of income tax.
    pub total_tax: Decimal,
    /// Sum of employer costs.
    pub total_employer_cost: Decimal,
    /// Mean net salary, zero when there are no records.
    pub average_net: Decimal,
    /// Record counts per status.
    pub status_counts: StatusCounts,
    /// Compliance check outcomes.
    pub compliance: ComplianceStats,
    /// Per-country totals, only when no country filter is given.
    pub country_distribution: Option<Vec<CountryBreakdown>>,
}

impl PayrollGenerator {
    /// Fetches one record of the tenant.
    pub async fn get_record(&self, tenant_id: &str, id: Uuid) -> PayrollResult<PayrollRecord> {
        self.store
            .get(tenant_id, id)
            .await?
            .ok_or(PayrollError::RecordNotFound { record_id: id })
    }

    /// Lists the tenant's records, newest period first.
    pub async fn list_records(
        &self,
        tenant_id: &str,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> PayrollResult<RecordPage> {
        let limit = self.page_limit(pagination)?;

        let mut records = self.store.query(tenant_id, filter).await?;
        records.sort_by(|a, b| {
            b.period
                .cmp(&a.period)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = records.len();
        let pages = total.div_ceil(limit as usize) as u32;
        let offset = (pagination.page as usize - 1).saturating_mul(limit as usize);
        let records = records.into_iter().skip(offset).take(limit as usize).collect();

        Ok(RecordPage {
            records,
            total,
            page: pagination.page,
            limit,
            pages,
        })
    }

    fn page_limit(&self, pagination: Pagination) -> PayrollResult<u32> {
        if pagination.page == 0 {
            return Err(PayrollError::validation("page", "must be at least 1"));
        }

        let limit = pagination.limit.unwrap_or(self.settings.default_page_limit);
        if limit == 0 || limit > self.settings.max_page_limit {
            return Err(PayrollError::validation(
                "limit",
                format!("must be between 1 and {}, got {}", self.settings.max_page_limit, limit),
            ));
        }
        Ok(limit)
    }

    /// Aggregates the tenant's records matching `filter`.
    pub async fn get_stats(
        &self,
        tenant_id: &str,
        filter: &StatsFilter,
    ) -> PayrollResult<PayrollStats> {
        let record_filter = RecordFilter {
            country: filter.country.clone(),
            period: filter.period,
            ..Default::default()
        };
        let records = self.store.query(tenant_id, &record_filter).await?;
        let total_employees = self.directory.count_active_employees(tenant_id).await?;

        let mut total_gross = Decimal::ZERO;
        let mut total_net = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        let mut total_employer_cost = Decimal::ZERO;
        let mut status_counts = StatusCounts::default();
        let mut compliance = ComplianceStats::default();
        let mut by_country: HashMap<&str, CountryBreakdown> = HashMap::new();

        for record in &records {
            total_gross += to_base(record.gross_salary, record);
            total_net += to_base(record.net_salary, record);
            total_tax += to_base(record.tax, record);
            total_employer_cost += to_base(record.total_employer_cost, record);
            status_counts.add(record.status);

            for check in &record.compliance_checks {
                match check.status {
                    ComplianceStatus::Passed => compliance.passed += 1,
                    ComplianceStatus::Failed => compliance.failed += 1,
                    ComplianceStatus::Warning => compliance.warning += 1,
                }
            }

            let entry = by_country
                .entry(record.country.as_str())
                .or_insert_with(|| CountryBreakdown {
                    country: record.country.clone(),
                    currency: record.currency.clone(),
                    count: 0,
                    total_gross: Decimal::ZERO,
                    total_net: Decimal::ZERO,
                });
            entry.count += 1;
            entry.total_gross += record.gross_salary;
            entry.total_net += record.net_salary;
        }

        let average_net = if records.is_empty() {
            Decimal::ZERO
        } else {
            round_money(total_net / Decimal::from(records.len()))
        };

        let country_distribution = filter.country.is_none().then(|| {
            let mut breakdown: Vec<CountryBreakdown> = by_country.into_values().collect();
            breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
            breakdown
        });

        Ok(PayrollStats {
            base_currency: self.converter.base_currency().to_string(),
            total_employees,
            processed_employees: records.len(),
            total_gross,
            total_net,
            total_tax,
            total_employer_cost,
            average_net,
            status_counts,
            compliance,
            country_distribution,
        })
    }
}

/// Converts a record amount back into the base currency.
fn to_base(amount: Decimal, record: &PayrollRecord) -> Decimal {
    if record.exchange_rate.is_zero() {
        return amount;
    }
    round_money(amount / record.exchange_rate)
}
