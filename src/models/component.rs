//! Payroll component model.
//!
//! A [`PayrollComponent`] is one line of a payslip: an allowance, a deduction
//! or a statutory contribution. Components are immutable once built; the
//! fields are private and exposed through accessors only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The category of a payroll component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// An addition to basic salary (housing, transport, bonus).
    Allowance,
    /// A non-statutory deduction.
    Deduction,
    /// A statutory contribution (employee or employer side).
    Statutory,
}

/// A single line item of a payroll record.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{ComponentKind, PayrollComponent};
/// use rust_decimal::Decimal;
///
/// let hra = PayrollComponent::allowance("House Rent Allowance", Decimal::new(30000, 0), true, true);
/// assert_eq!(hra.kind(), ComponentKind::Allowance);
/// assert!(hra.taxable());
/// assert_eq!(hra.statutory_code(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollComponent {
    name: String,
    amount: Decimal,
    #[serde(rename = "type")]
    kind: ComponentKind,
    taxable: bool,
    country_specific: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    statutory_code: Option<String>,
}

impl PayrollComponent {
    /// Creates an allowance component.
    pub fn allowance(
        name: impl Into<String>,
        amount: Decimal,
        taxable: bool,
        country_specific: bool,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            kind: ComponentKind::Allowance,
            taxable,
            country_specific,
            statutory_code: None,
        }
    }

    /// Creates a non-statutory deduction component.
    pub fn deduction(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
            kind: ComponentKind::Deduction,
            taxable: false,
            country_specific: true,
            statutory_code: None,
        }
    }

    /// Creates a statutory contribution component.
    ///
    /// Statutory components are never taxable and always country specific.
    pub fn statutory(
        name: impl Into<String>,
        amount: Decimal,
        statutory_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            kind: ComponentKind::Statutory,
            taxable: false,
            country_specific: true,
            statutory_code: Some(statutory_code.into()),
        }
    }

    /// The display name of the component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The monetary amount in the payroll currency.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The component category.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Whether the component counts towards taxable pay.
    pub fn taxable(&self) -> bool {
        self.taxable
    }

    /// Whether the component comes from a country-specific strategy.
    pub fn country_specific(&self) -> bool {
        self.country_specific
    }

    /// The machine-readable code of a statutory component.
    pub fn statutory_code(&self) -> Option<&str> {
        self.statutory_code.as_deref()
    }
}

/// Sums the amounts of a slice of components.
pub fn total_amount(components: &[PayrollComponent]) -> Decimal {
    components.iter().map(PayrollComponent::amount).sum()
}

/// Converts a contribution name into its statutory code ("Provident Fund" → "provident_fund").
pub fn statutory_code_for(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
