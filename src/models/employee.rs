//! Employee model.
//!
//! Employees live in an external directory; this is the slice of an employee
//! record the payroll engine reads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee as supplied by the employee directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee within the tenant.
    pub id: String,
    /// The tenant the employee belongs to.
    pub tenant_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Monthly base salary, expressed in `currency`.
    pub base_salary: Decimal,
    /// ISO currency code of `base_salary`.
    pub currency: String,
    /// The employee's home country.
    pub country: String,
    /// Department used for bulk filtering.
    #[serde(default)]
    pub department: Option<String>,
    /// Whether the employee is currently employed.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Returns true if the employee belongs to the given department.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     tenant_id: "acme".to_string(),
    ///     name: "Asha".to_string(),
    ///     base_salary: Decimal::new(75000, 0),
    ///     currency: "INR".to_string(),
    ///     country: "India".to_string(),
    ///     department: Some("Engineering".to_string()),
    ///     active: true,
    /// };
    /// assert!(employee.in_department("Engineering"));
    /// assert!(!employee.in_department("Sales"));
    /// ```
    pub fn in_department(&self, department: &str) -> bool {
        self.department.as_deref() == Some(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_defaults() {
        let json = r#"{
            "id": "emp_001",
            "tenant_id": "acme",
            "base_salary": "75000",
            "currency": "INR",
            "country": "India"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.base_salary, Decimal::new(75000, 0));
        assert!(employee.active);
        assert!(employee.department.is_none());
        assert!(employee.name.is_empty());
    }

    #[test]
    fn test_deserialize_inactive_employee() {
        let json = r#"{
            "id": "emp_002",
            "tenant_id": "acme",
            "name": "Ben",
            "base_salary": "4200.50",
            "currency": "GBP",
            "country": "UK",
            "department": "Sales",
            "active": false
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert!(!employee.active);
        assert_eq!(employee.base_salary, Decimal::new(420050, 2));
        assert!(employee.in_department("Sales"));
    }

    #[test]
    fn test_no_department_never_matches() {
        let employee = Employee {
            id: "emp_003".to_string(),
            tenant_id: "acme".to_string(),
            name: String::new(),
            base_salary: Decimal::ONE,
            currency: "USD".to_string(),
            country: "US".to_string(),
            department: None,
            active: true,
        };
        assert!(!employee.in_department(""));
    }
}
