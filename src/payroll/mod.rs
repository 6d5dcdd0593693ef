//! Payroll generation, lifecycle and reporting.
//!
//! [`PayrollGenerator`] ties the calculation modules to the employee
//! directory, the record store, the tax rule repository and the currency
//! converter. The directory and store are traits so a host can supply its
//! own persistence; in-memory implementations are provided.

mod computation;
mod directory;
mod generator;
mod query;
mod store;

pub use computation::{MAX_BASIC_SALARY, PayrollComputation, PayrollInputs, compute_payroll};
pub use directory::{EmployeeDirectory, EmployeeFilter, InMemoryEmployeeDirectory};
pub use generator::{BulkFailure, BulkGenerationSummary, ENGINE_VERSION, PayrollGenerator};
pub use query::{
    ComplianceStats, CountryBreakdown, Pagination, PayrollStats, RecordPage, StatsFilter,
    StatusCounts,
};
pub use store::{InMemoryPayrollStore, PayrollStore, RecordFilter, RecordPatch};
