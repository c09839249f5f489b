//! The payroll service.
//!
//! [`PayrollEngine`] owns the store and the policy and exposes every payroll
//! workflow: generation, attendance, advances and installments, adjustments,
//! status transitions, referrals, and statements. Each workflow runs in one
//! store transaction, so a failed step leaves nothing behind.
//!
//! While a salary is pending, every change to an input it depends on
//! recomposes it inside the same transaction. Frozen salaries are never
//! recomposed.

mod advances;
mod attendance;
mod generation;
mod outcome;
mod referrals;
mod salaries;

pub use attendance::AttendanceSubmission;
pub use outcome::{
    AttendanceConflict, BulkStatusItem, BulkStatusOutcome, GenerationAction, GenerationFailure,
    GenerationSummary, InstallmentDecision, ReferralRunSummary, SalarySummary,
    StatusChangeOutcome, UndoReferralsOutcome,
};
pub use referrals::NewReferral;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{SalaryInput, calculate_salary, write_snapshot};
use crate::config::{ConfigLoader, PayrollPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayPeriod, SalaryStatement};
use crate::store::{PayrollData, PayrollStore};

/// Payroll workflows over a transactional store.
#[derive(Debug, Default)]
pub struct PayrollEngine {
    store: PayrollStore,
    policy: PayrollPolicy,
}

impl PayrollEngine {
    /// Creates an engine with an empty store.
    pub fn new(policy: PayrollPolicy) -> Self {
        Self {
            store: PayrollStore::new(),
            policy: policy.normalized(),
        }
    }

    /// Creates an engine using the policy from loaded configuration.
    pub fn from_config(config: &ConfigLoader) -> Self {
        Self::new(config.policy().clone())
    }

    /// The policy applied by the salary pipeline.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    /// The underlying store.
    pub fn store(&self) -> &PayrollStore {
        &self.store
    }

    /// Registers an employee.
    pub fn register_employee(&self, employee: Employee) -> EngineResult<Employee> {
        if employee.id.trim().is_empty() {
            return Err(EngineError::validation("id", "must not be empty"));
        }
        if employee.base_salary.is_some_and(|s| s.is_sign_negative()) {
            return Err(EngineError::validation("base_salary", "must not be negative"));
        }

        let employee = self.store.transaction(|data| {
            data.insert_employee(employee.clone())?;
            Ok(employee)
        })?;

        tracing::info!(
            employee_id = %employee.id,
            status = ?employee.status,
            "Registered employee"
        );
        Ok(employee)
    }

    /// Looks up an employee.
    pub fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.store.read(|data| data.employee(employee_id).cloned())
    }
}

/// Recomputes a pending salary from current inputs and stores the snapshot.
fn recompose(
    data: &mut PayrollData,
    salary_id: Uuid,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<SalaryStatement> {
    let salary = data.salary(salary_id)?.clone();
    salary.ensure_pending("recompute salary")?;

    let attendance = data.attendance_for(&salary.employee_id, salary.period);
    let installments = data.installments_for_salary(salary.id);
    let statement = calculate_salary(
        &SalaryInput::for_salary(&salary, &attendance, &installments),
        policy,
    );

    let stored = data.salary_mut(salary_id)?;
    write_snapshot(
        stored,
        &statement.attendance,
        &statement.earnings,
        &statement.deductions,
        now,
    );

    debug!(
        salary_id = %salary_id,
        employee_id = %salary.employee_id,
        period = %salary.period,
        net_salary = %statement.net_salary,
        "Recomposed pending salary"
    );
    Ok(statement)
}

/// Recomposes the employee's salary for `period` if one exists and is pending.
fn recompose_if_pending(
    data: &mut PayrollData,
    employee_id: &str,
    period: PayPeriod,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<Option<Uuid>> {
    match data.salary_for(employee_id, period) {
        Some(salary) if salary.is_pending() => {
            let id = salary.id;
            recompose(data, id, policy, now)?;
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}
