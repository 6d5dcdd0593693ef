//! Multi-country payroll engine
//!
//! This crate computes monthly payroll for employees across countries: gross
//! pay from basic salary and country allowances, progressive income tax,
//! statutory contributions, net pay and employer cost. Each payroll is stored
//! as a record with an audit trace of every calculation step and moves
//! through the `draft → processed → paid` lifecycle.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use payroll_engine::config::PayrollSettings;
//! use payroll_engine::currency::{CurrencyConverter, UnavailableRateSource};
//! use payroll_engine::models::{Employee, PayPeriod};
//! use payroll_engine::payroll::{
//!     InMemoryEmployeeDirectory, InMemoryPayrollStore, PayrollGenerator,
//! };
//! use payroll_engine::tax_rules::TaxRuleRepository;
//! use rust_decimal::Decimal;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let settings = PayrollSettings::default();
//! let employee = Employee {
//!     id: "emp_001".to_string(),
//!     tenant_id: "acme".to_string(),
//!     name: "Priya".to_string(),
//!     base_salary: Decimal::new(75000, 0),
//!     currency: "INR".to_string(),
//!     country: "India".to_string(),
//!     department: None,
//!     active: true,
//! };
//!
//! let generator = PayrollGenerator::new(
//!     Arc::new(InMemoryEmployeeDirectory::with_employees([employee])),
//!     Arc::new(InMemoryPayrollStore::new()),
//!     Arc::new(TaxRuleRepository::new()),
//!     Arc::new(CurrencyConverter::new(Arc::new(UnavailableRateSource), &settings)),
//!     settings,
//! );
//!
//! let period = PayPeriod::new(3, 2025).unwrap();
//! let record = generator.generate("acme", "emp_001", "India", period).await.unwrap();
//! assert_eq!(record.currency, "INR");
//! assert_eq!(record.gross_salary, Decimal::new(115350, 0));
//! # }
//! ```

#![warn(missing_docs)]

pub mod calculation;
pub mod compensation;
pub mod compliance;
pub mod config;
pub mod countries;
pub mod currency;
pub mod error;
pub mod models;
pub mod payroll;
pub mod tax_rules;
