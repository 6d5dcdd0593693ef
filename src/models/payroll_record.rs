//! Payroll record models.
//!
//! This module contains the [`PayrollRecord`] type and its lifecycle
//! [`PayrollStatus`], plus the payment details captured when a record is paid.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, ComplianceCheck, PayPeriod, PayrollComponent};

/// The lifecycle status of a payroll record.
///
/// ```text
/// draft ──process──▶ processed ──mark_paid──▶ paid
///   │                    │
///   └──────cancel────────┴──────▶ cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Freshly generated; values may still be reviewed.
    Draft,
    /// Approved for payment.
    Processed,
    /// Payment has been made. Terminal.
    Paid,
    /// Withdrawn before payment. Terminal.
    Cancelled,
}

impl PayrollStatus {
    /// Returns true if a record in this status may move to `next`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayrollStatus;
    ///
    /// assert!(PayrollStatus::Draft.can_transition_to(PayrollStatus::Processed));
    /// assert!(!PayrollStatus::Draft.can_transition_to(PayrollStatus::Paid));
    /// assert!(!PayrollStatus::Paid.can_transition_to(PayrollStatus::Cancelled));
    /// ```
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        use PayrollStatus::*;
        matches!(
            (self, next),
            (Draft, Processed) | (Processed, Paid) | (Draft, Cancelled) | (Processed, Cancelled)
        )
    }

    /// Returns true for statuses no transition leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, PayrollStatus::Paid | PayrollStatus::Cancelled)
    }

    /// The snake_case name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Processed => "processed",
            PayrollStatus::Paid => "paid",
            PayrollStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the exchange rate of a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// The live rate source.
    Live,
    /// The static fallback table.
    Fallback,
}

/// How a payroll was paid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer.
    #[default]
    BankTransfer,
    /// Paper check.
    Check,
    /// Cash.
    Cash,
    /// Digital wallet.
    DigitalWallet,
}

/// Bank account details recorded with a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    /// Bank name.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Account number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// SWIFT/BIC code.
    #[serde(default)]
    pub swift_code: Option<String>,
    /// Routing number.
    #[serde(default)]
    pub routing_number: Option<String>,
}

/// Payment information captured by the `processed → paid` transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// The date the payment was made.
    pub payment_date: NaiveDate,
    /// The payment method.
    pub method: PaymentMethod,
    /// Bank details for bank transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

/// The identifying tuple of a payroll record. At most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// The tenant.
    pub tenant_id: String,
    /// The employee.
    pub employee_id: String,
    /// The payroll country.
    pub country: String,
    /// The pay period.
    pub period: PayPeriod,
}

impl RecordKey {
    /// Creates a key.
    pub fn new(
        tenant_id: impl Into<String>,
        employee_id: impl Into<String>,
        country: impl Into<String>,
        period: PayPeriod,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            employee_id: employee_id.into(),
            country: country.into(),
            period,
        }
    }
}

/// A computed payroll for one employee, one country and one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// The tenant that owns the record.
    pub tenant_id: String,
    /// The employee the record is for.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// The payroll country.
    pub country: String,
    /// ISO code of the currency all amounts are in.
    pub currency: String,
    /// Units of `currency` per unit of the base currency.
    pub exchange_rate: Decimal,
    /// Whether the rate came from the live source or the fallback table.
    pub exchange_rate_source: RateOrigin,
    /// Basic monthly salary in `currency`.
    pub basic_salary: Decimal,
    /// Allowances added to basic salary.
    pub allowances: Vec<PayrollComponent>,
    /// Total standard deductions subtracted before tax.
    pub standard_deductions: Decimal,
    /// Employee-side statutory contributions.
    pub statutory_deductions: Vec<PayrollComponent>,
    /// Employer-side statutory contributions.
    pub employer_contributions: Vec<PayrollComponent>,
    /// Basic salary plus allowances.
    pub gross_salary: Decimal,
    /// Gross salary less standard deductions, floored at zero.
    pub taxable_income: Decimal,
    /// Income tax for the period.
    pub tax: Decimal,
    /// Gross less tax less employee statutory contributions.
    pub net_salary: Decimal,
    /// Gross plus employer contributions.
    pub total_employer_cost: Decimal,
    /// Advisory compliance findings.
    pub compliance_checks: Vec<ComplianceCheck>,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// Payment details, present once paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
    /// Step-by-step record of how the amounts were derived.
    pub audit_trace: AuditTrace,
    /// The version of the engine that produced the record.
    pub engine_version: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// The identifying tuple of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(
            self.tenant_id.clone(),
            self.employee_id.clone(),
            self.country.clone(),
            self.period,
        )
    }
}
