//! Compliance finding models.

use serde::{Deserialize, Serialize};

/// Outcome of a single compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// The check passed.
    Passed,
    /// The check failed. Advisory only; the record is still created.
    Failed,
    /// The check raised a concern that needs review.
    Warning,
}

/// A named compliance finding attached to a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// The check name (e.g., "Minimum Wage Compliance").
    pub name: String,
    /// The outcome.
    pub status: ComplianceStatus,
    /// Human-readable explanation.
    pub message: String,
}

impl ComplianceCheck {
    /// Creates a finding.
    pub fn new(
        name: impl Into<String>,
        status: ComplianceStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}
