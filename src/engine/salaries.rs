//! Salary adjustments and status transitions.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, EmployeeStatus, SalaryStatement, SalaryStatus};

use super::outcome::{BulkStatusItem, BulkStatusOutcome, StatusChangeOutcome};
use super::{PayrollEngine, recompose};

impl PayrollEngine {
    /// Adds a bonus and/or a deduction to a pending salary.
    pub fn adjust_salary(
        &self,
        salary_id: Uuid,
        bonus_amount: Decimal,
        deduction_amount: Decimal,
    ) -> EngineResult<SalaryStatement> {
        let now = Utc::now();
        let statement = self.store.transaction(|data| {
            data.salary_mut(salary_id)?
                .apply_adjustment(bonus_amount, deduction_amount, now)?;
            recompose(data, salary_id, &self.policy, now)
        })?;

        info!(
            salary_id = %salary_id,
            bonus_amount = %bonus_amount,
            deduction_amount = %deduction_amount,
            net_salary = %statement.net_salary,
            "Adjusted salary"
        );
        Ok(statement)
    }

    /// Moves a salary along `pending -> processing -> paid | failed`.
    ///
    /// Entering processing requires every installment to be decided and no
    /// duplicate attendance for the month; the salary is recomposed one last
    /// time and then frozen. Entering paid sets `suggest_mark_inactive` when
    /// the employee is partially inactive.
    pub fn update_salary_status(
        &self,
        salary_id: Uuid,
        next: SalaryStatus,
    ) -> EngineResult<StatusChangeOutcome> {
        let now = Utc::now();
        let outcome = self.store.transaction(|data| {
            let salary = data.salary(salary_id)?.clone();
            if !salary.status.can_transition_to(next) {
                return Err(EngineError::conflict(format!(
                    "salary {} cannot move from {} to {}",
                    salary_id,
                    salary.status.as_str(),
                    next.as_str()
                )));
            }

            if next == SalaryStatus::Processing {
                let pending = data
                    .installments_for_salary(salary_id)
                    .iter()
                    .filter(|i| i.is_pending())
                    .count();
                if pending > 0 {
                    return Err(EngineError::conflict(format!(
                        "salary {} has {} pending installment(s)",
                        salary_id, pending
                    )));
                }
                if !data
                    .attendance_conflicts(salary.period, Some(&salary.employee_id))
                    .is_empty()
                {
                    return Err(EngineError::conflict(format!(
                        "employee {} has duplicate attendance in {}",
                        salary.employee_id, salary.period
                    )));
                }
                recompose(data, salary_id, &self.policy, now)?;
            }

            let stored = data.salary_mut(salary_id)?;
            stored.transition_to(next, now)?;
            let salary = stored.clone();

            let suggest_mark_inactive = next == SalaryStatus::Paid
                && data
                    .employee(&salary.employee_id)
                    .is_ok_and(|e| e.is_partial_inactive());

            Ok(StatusChangeOutcome {
                salary,
                suggest_mark_inactive,
            })
        })?;

        info!(
            salary_id = %salary_id,
            employee_id = %outcome.salary.employee_id,
            status = next.as_str(),
            suggest_mark_inactive = outcome.suggest_mark_inactive,
            "Salary status updated"
        );
        Ok(outcome)
    }

    /// Applies a status transition to each salary independently.
    pub fn update_salary_statuses(
        &self,
        salary_ids: &[Uuid],
        next: SalaryStatus,
    ) -> BulkStatusOutcome {
        let mut outcome = BulkStatusOutcome {
            updated: 0,
            failed: 0,
            results: Vec::with_capacity(salary_ids.len()),
        };

        for &salary_id in salary_ids {
            match self.update_salary_status(salary_id, next) {
                Ok(change) => {
                    outcome.updated += 1;
                    outcome.results.push(BulkStatusItem {
                        salary_id,
                        updated: true,
                        status: Some(change.salary.status),
                        suggest_mark_inactive: change.suggest_mark_inactive,
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(salary_id = %salary_id, error = %err, "Bulk status change refused");
                    outcome.failed += 1;
                    let status = self
                        .store
                        .read(|data| data.salary(salary_id).map(|s| s.status).ok());
                    outcome.results.push(BulkStatusItem {
                        salary_id,
                        updated: false,
                        status,
                        suggest_mark_inactive: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }
        outcome
    }

    /// Marks an employee fully inactive, usually after their final salary is paid.
    pub fn mark_employee_inactive(&self, employee_id: &str) -> EngineResult<Employee> {
        let employee = self.store.transaction(|data| {
            let employee = data.employee_mut(employee_id)?;
            if employee.status == EmployeeStatus::Inactive {
                return Err(EngineError::conflict(format!(
                    "employee {} is already inactive",
                    employee_id
                )));
            }
            employee.status = EmployeeStatus::Inactive;
            Ok(employee.clone())
        })?;

        info!(employee_id = %employee_id, "Marked employee inactive");
        Ok(employee)
    }
}
