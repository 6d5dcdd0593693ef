//! Allowance strategies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_money;
use crate::models::PayrollComponent;

/// Produces the country-specific allowances for a basic salary.
///
/// Any `Fn(Decimal) -> Vec<PayrollComponent>` closure is a strategy, so
/// one-off rules can be registered without a new type.
pub trait AllowanceStrategy: Send + Sync {
    /// Returns the allowances owed on `basic_salary`.
    fn allowances(&self, basic_salary: Decimal) -> Vec<PayrollComponent>;
}

impl<F> AllowanceStrategy for F
where
    F: Fn(Decimal) -> Vec<PayrollComponent> + Send + Sync,
{
    fn allowances(&self, basic_salary: Decimal) -> Vec<PayrollComponent> {
        self(basic_salary)
    }
}

/// How an allowance amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceAmount {
    /// A fixed monthly amount.
    Fixed(Decimal),
    /// A fraction of basic salary.
    ShareOfBasic(Decimal),
}

/// One line of an [`AllowanceSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceLine {
    /// Allowance name.
    pub name: String,
    /// How the amount is derived.
    pub amount: AllowanceAmount,
    /// Whether the allowance is taxable.
    pub taxable: bool,
}

/// A data-driven strategy: a list of fixed or salary-proportional lines.
///
/// # Example
///
/// ```
/// use payroll_engine::compensation::{AllowanceSchedule, AllowanceStrategy};
/// use rust_decimal_macros::dec;
///
/// let schedule = AllowanceSchedule::new()
///     .share_of_basic("House Rent Allowance", dec!(0.4), true)
///     .fixed("Medical Allowance", dec!(1250), false);
///
/// let allowances = schedule.allowances(dec!(75000));
/// assert_eq!(allowances[0].amount(), dec!(30000));
/// assert_eq!(allowances[1].amount(), dec!(1250));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceSchedule {
    lines: Vec<AllowanceLine>,
}

impl AllowanceSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed-amount line.
    pub fn fixed(mut self, name: impl Into<String>, amount: Decimal, taxable: bool) -> Self {
        self.lines.push(AllowanceLine {
            name: name.into(),
            amount: AllowanceAmount::Fixed(amount),
            taxable,
        });
        self
    }

    /// Adds a line paying `rate` of basic salary.
    pub fn share_of_basic(mut self, name: impl Into<String>, rate: Decimal, taxable: bool) -> Self {
        self.lines.push(AllowanceLine {
            name: name.into(),
            amount: AllowanceAmount::ShareOfBasic(rate),
            taxable,
        });
        self
    }

    /// The schedule's lines.
    pub fn lines(&self) -> &[AllowanceLine] {
        &self.lines
    }
}

impl AllowanceStrategy for AllowanceSchedule {
    fn allowances(&self, basic_salary: Decimal) -> Vec<PayrollComponent> {
        self.lines
            .iter()
            .map(|line| {
                let amount = match line.amount {
                    AllowanceAmount::Fixed(amount) => amount,
                    AllowanceAmount::ShareOfBasic(rate) => round_money(basic_salary * rate),
                };
                PayrollComponent::allowance(line.name.clone(), amount, line.taxable, true)
            })
            .collect()
    }
}
