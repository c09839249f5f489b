//! Salary generation, recomputation, and deletion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{SalaryInput, calculate_salary, statement_from_snapshot};
use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdvancePaymentInstallment, PayPeriod, Referral, Salary, SalaryStatement, SalaryStatus,
};
use crate::store::PayrollData;

use super::outcome::{GenerationAction, GenerationFailure, GenerationSummary, SalarySummary};
use super::referrals::apply_referrals;
use super::{PayrollEngine, recompose};

impl PayrollEngine {
    /// Generates salaries for one employee or for every active salaried employee.
    ///
    /// Refused with `Conflict` while duplicate attendance exists for any
    /// targeted employee in the month. Salaries already processing or paid
    /// are skipped. Each employee runs in its own transaction; in a bulk run
    /// a failing employee is reported and the others still proceed.
    pub fn generate_salaries(
        &self,
        period: PayPeriod,
        employee_id: Option<&str>,
    ) -> EngineResult<GenerationSummary> {
        let targets: Vec<String> = self.store.read(|data| match employee_id {
            Some(id) => data.employee(id).map(|e| vec![e.id.clone()]),
            None => {
                let mut ids: Vec<String> = data
                    .employees()
                    .filter(|e| e.is_payroll_eligible())
                    .map(|e| e.id.clone())
                    .collect();
                ids.sort();
                Ok(ids)
            }
        })?;

        let conflicts = self
            .store
            .read(|data| data.attendance_conflicts(period, employee_id));
        if !conflicts.is_empty() {
            warn!(
                period = %period,
                conflicts = conflicts.len(),
                "Generation blocked by attendance conflicts"
            );
            return Err(EngineError::conflict(format!(
                "{} duplicate attendance entr{} in {} must be resolved before generating salaries",
                conflicts.len(),
                if conflicts.len() == 1 { "y" } else { "ies" },
                period
            )));
        }

        let mut summary = GenerationSummary {
            period,
            processed: 0,
            skipped: 0,
            salaries: Vec::new(),
            failures: Vec::new(),
        };

        for target in &targets {
            let frozen = self.store.read(|data| {
                data.salary_for(target, period).is_some_and(|s| {
                    matches!(s.status, SalaryStatus::Processing | SalaryStatus::Paid)
                })
            });
            if frozen {
                summary.skipped += 1;
                continue;
            }

            let now = Utc::now();
            match self
                .store
                .transaction(|data| generate_in(data, target, period, &self.policy, now))
            {
                Ok(generated) => {
                    summary.processed += 1;
                    summary.salaries.push(generated);
                }
                Err(err) if employee_id.is_some() => return Err(err),
                Err(err) => {
                    warn!(
                        employee_id = %target,
                        period = %period,
                        error = %err,
                        "Salary generation failed"
                    );
                    summary.failures.push(GenerationFailure {
                        employee_id: target.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            period = %period,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "Salary generation completed"
        );
        Ok(summary)
    }

    /// Creates a salary row, failing with `Duplicate` if one already exists.
    pub fn create_salary(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<SalarySummary> {
        let now = Utc::now();
        let created = self.store.transaction(|data| {
            let base_salary = configured_salary(data, employee_id)?;
            let salary = Salary::new_pending(employee_id, period, base_salary, now);
            let salary_id = data.insert_salary(salary)?;
            finish_generation(data, salary_id, GenerationAction::Created, &self.policy, now)
        })?;

        info!(
            salary_id = %created.salary_id,
            employee_id = %employee_id,
            period = %period,
            "Created salary"
        );
        Ok(created)
    }

    /// Recomputes a pending salary from current inputs.
    ///
    /// For a frozen salary nothing is written and the snapshot statement is
    /// returned.
    pub fn recompute_salary(&self, salary_id: Uuid) -> EngineResult<SalaryStatement> {
        let frozen = self
            .store
            .read(|data| data.salary(salary_id).map(|s| s.status.is_frozen()))?;
        if frozen {
            return self.salary_statement(salary_id);
        }
        let now = Utc::now();
        self.store
            .transaction(|data| recompose(data, salary_id, &self.policy, now))
    }

    /// Deletes a pending salary together with its undecided installments.
    ///
    /// Refused with `Conflict` when the salary is not pending, has approved
    /// installments, or carries paid referral bonuses.
    pub fn delete_salary(&self, salary_id: Uuid) -> EngineResult<Salary> {
        let deleted = self.store.transaction(|data| {
            let salary = data.salary(salary_id)?;
            salary.ensure_pending("delete salary")?;

            let installments = data.installments_for_salary(salary_id);
            if installments.iter().any(|i| i.is_approved()) {
                return Err(EngineError::conflict(format!(
                    "salary {} has approved installments",
                    salary_id
                )));
            }
            if data
                .referrals_by(&salary.employee_id)
                .any(|r| r.salary_id == Some(salary_id) && r.paid_at.is_some())
            {
                return Err(EngineError::conflict(format!(
                    "salary {} carries paid referral bonuses; undo them first",
                    salary_id
                )));
            }

            for installment in installments {
                data.remove_installment(installment.id)?;
            }
            data.remove_salary(salary_id)
        })?;

        info!(
            salary_id = %salary_id,
            employee_id = %deleted.employee_id,
            period = %deleted.period,
            "Deleted salary"
        );
        Ok(deleted)
    }

    /// Returns the statement for a salary.
    ///
    /// A pending salary is recomputed from live attendance without writing
    /// anything; a frozen salary is derived from its stored snapshot.
    pub fn salary_statement(&self, salary_id: Uuid) -> EngineResult<SalaryStatement> {
        self.store.read(|data| {
            let salary = data.salary(salary_id)?;
            let installments = data.installments_for_salary(salary_id);
            if salary.is_pending() {
                let attendance = data.attendance_for(&salary.employee_id, salary.period);
                Ok(calculate_salary(
                    &SalaryInput::for_salary(salary, &attendance, &installments),
                    &self.policy,
                ))
            } else {
                Ok(statement_from_snapshot(salary, &installments, &self.policy))
            }
        })
    }

    /// Returns a salary row.
    pub fn salary(&self, salary_id: Uuid) -> EngineResult<Salary> {
        self.store.read(|data| data.salary(salary_id).cloned())
    }

    /// Returns the salary row for an employee and month, if any.
    pub fn salary_for(&self, employee_id: &str, period: PayPeriod) -> Option<Salary> {
        self.store
            .read(|data| data.salary_for(employee_id, period).cloned())
    }
}

fn configured_salary(data: &PayrollData, employee_id: &str) -> EngineResult<Decimal> {
    data.employee(employee_id)?
        .base_salary
        .ok_or_else(|| {
            EngineError::validation(
                "base_salary",
                format!("employee {} has no configured salary", employee_id),
            )
        })
}

/// Creates, recomputes, or replaces the employee's salary for `period`.
pub(super) fn generate_in(
    data: &mut PayrollData,
    employee_id: &str,
    period: PayPeriod,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<SalarySummary> {
    let base_salary = configured_salary(data, employee_id)?;

    if !data.attendance_conflicts(period, Some(employee_id)).is_empty() {
        return Err(EngineError::conflict(format!(
            "employee {} has duplicate attendance in {}",
            employee_id, period
        )));
    }

    let existing = data.salary_for(employee_id, period).cloned();
    let (salary_id, action) = match existing {
        None => {
            let salary = Salary::new_pending(employee_id, period, base_salary, now);
            let id = data.insert_salary(salary)?;
            (id, GenerationAction::Created)
        }
        Some(salary) if salary.is_pending() => {
            let stored = data.salary_mut(salary.id)?;
            stored.base_salary = base_salary;
            (salary.id, GenerationAction::Recomputed)
        }
        Some(salary) if salary.status == SalaryStatus::Failed => {
            (replace_failed(data, salary, base_salary, now)?, GenerationAction::Replaced)
        }
        Some(salary) => {
            return Err(EngineError::conflict(format!(
                "salary {} for {} in {} is {} and cannot be regenerated",
                salary.id,
                employee_id,
                period,
                salary.status.as_str()
            )));
        }
    };

    finish_generation(data, salary_id, action, policy, now)
}

/// Suggests installments, applies referrals, and recomposes.
fn finish_generation(
    data: &mut PayrollData,
    salary_id: Uuid,
    action: GenerationAction,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<SalarySummary> {
    suggest_installments(data, salary_id)?;
    apply_referrals(data, salary_id, policy, now)?;
    let statement = recompose(data, salary_id, policy, now)?;
    Ok(SalarySummary::from_statement(&statement, salary_id, action))
}

/// Adds a pending installment for every open advance with none on this salary.
fn suggest_installments(data: &mut PayrollData, salary_id: Uuid) -> EngineResult<usize> {
    let salary = data.salary(salary_id)?;
    let employee_id = salary.employee_id.clone();
    let linked: Vec<Uuid> = data
        .installments_for_salary(salary_id)
        .iter()
        .map(|i| i.advance_id)
        .collect();

    let mut created = 0;
    for advance in data.open_advances_for(&employee_id) {
        if linked.contains(&advance.id) {
            continue;
        }
        let amount = advance.suggested_installment();
        let installment = AdvancePaymentInstallment::pending(&advance, salary_id, amount);
        data.save_installment(installment);
        created += 1;
    }
    Ok(created)
}

/// Replaces a failed salary with a new pending row for the same month.
///
/// Approved installments and paid referrals move to the new row; undecided
/// and rejected installments are dropped and will be suggested again.
fn replace_failed(
    data: &mut PayrollData,
    failed: Salary,
    base_salary: Decimal,
    now: DateTime<Utc>,
) -> EngineResult<Uuid> {
    data.remove_salary(failed.id)?;

    let mut replacement =
        Salary::new_pending(failed.employee_id.clone(), failed.period, base_salary, now);
    replacement.other_bonuses = failed.other_bonuses;
    replacement.other_deductions = failed.other_deductions;
    let replacement_id = data.insert_salary(replacement)?;

    for mut installment in data.installments_for_salary(failed.id) {
        if installment.is_approved() {
            installment.salary_id = replacement_id;
            data.save_installment(installment);
        } else {
            data.remove_installment(installment.id)?;
        }
    }
    let carried: Vec<Referral> = data
        .referrals_by(&failed.employee_id)
        .filter(|r| r.salary_id == Some(failed.id))
        .cloned()
        .collect();
    for mut referral in carried {
        referral.salary_id = Some(replacement_id);
        data.save_referral(referral);
    }

    info!(
        failed_salary_id = %failed.id,
        salary_id = %replacement_id,
        employee_id = %failed.employee_id,
        period = %failed.period,
        "Replaced failed salary"
    );
    Ok(replacement_id)
}
