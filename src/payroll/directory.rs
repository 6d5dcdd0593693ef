//! Employee directory collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::PayrollResult;
use crate::models::Employee;

/// Narrows the employees a bulk run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    /// Only employees of this department.
    #[serde(default)]
    pub department: Option<String>,
}

impl EmployeeFilter {
    /// A filter matching every employee.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter matching one department.
    pub fn department(department: impl Into<String>) -> Self {
        Self {
            department: Some(department.into()),
        }
    }

    /// Returns true if `employee` passes the filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.department
            .as_deref()
            .is_none_or(|department| employee.in_department(department))
    }
}

/// Read access to the tenant's employees.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee of the tenant.
    async fn get_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> PayrollResult<Option<Employee>>;

    /// Lists the tenant's active employees matching `filter`.
    async fn list_active_employees(
        &self,
        tenant_id: &str,
        filter: &EmployeeFilter,
    ) -> PayrollResult<Vec<Employee>>;

    /// Counts the tenant's active employees.
    async fn count_active_employees(&self, tenant_id: &str) -> PayrollResult<usize>;
}

/// An [`EmployeeDirectory`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<HashMap<(String, String), Employee>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `employees`.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let employees = employees
            .into_iter()
            .map(|e| ((e.tenant_id.clone(), e.id.clone()), e))
            .collect();
        Self {
            employees: RwLock::new(employees),
        }
    }

    /// Inserts or replaces an employee.
    pub async fn upsert(&self, employee: Employee) {
        self.employees
            .write()
            .await
            .insert((employee.tenant_id.clone(), employee.id.clone()), employee);
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn get_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> PayrollResult<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .get(&(tenant_id.to_string(), employee_id.to_string()))
            .cloned())
    }

    async fn list_active_employees(
        &self,
        tenant_id: &str,
        filter: &EmployeeFilter,
    ) -> PayrollResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .employees
            .read()
            .await
            .values()
            .filter(|e| e.tenant_id == tenant_id && e.active && filter.matches(e))
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(employees)
    }

    async fn count_active_employees(&self, tenant_id: &str) -> PayrollResult<usize> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .filter(|e| e.tenant_id == tenant_id && e.active)
            .count())
    }
}
