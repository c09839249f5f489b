//! Employee model and related types.
//!
//! This module defines the Employee struct and EmployeeStatus enum
//! for representing salaried workers in the payroll engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the lifecycle state of an employee account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Account created but not yet approved.
    Pending,
    /// Employed and on the payroll.
    Active,
    /// Left mid-month and awaiting final payment.
    PartialInactive,
    /// No longer employed.
    Inactive,
    /// Candidate holding an unaccepted job offer.
    JobOffer,
}

/// Represents an employee whose salary the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Configured monthly salary, if any.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// Lifecycle state of the account.
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns true if the employee should be included in bulk salary generation.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmployeeStatus};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Asha".to_string(),
    ///     base_salary: Some(Decimal::new(30000, 0)),
    ///     status: EmployeeStatus::Active,
    /// };
    /// assert!(employee.is_payroll_eligible());
    /// ```
    pub fn is_payroll_eligible(&self) -> bool {
        self.status == EmployeeStatus::Active && self.base_salary.is_some()
    }

    /// Returns true if the employee left mid-month and awaits final payment.
    pub fn is_partial_inactive(&self) -> bool {
        self.status == EmployeeStatus::PartialInactive
    }
}
