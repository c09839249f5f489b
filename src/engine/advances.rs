//! Advances and the installment workflow.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation;
use crate::error::EngineResult;
use crate::models::Advance;

use super::outcome::InstallmentDecision;
use super::{PayrollEngine, recompose};

/// Which decision to apply to an installment.
enum InstallmentAction<'a> {
    Approve(&'a str),
    Reject(&'a str),
    Edit(Decimal),
}

impl PayrollEngine {
    /// Records a new advance request.
    pub fn create_advance(
        &self,
        employee_id: &str,
        amount: Decimal,
        emi_amount: Decimal,
        reason: Option<String>,
    ) -> EngineResult<Advance> {
        let advance = Advance::new(employee_id, amount, emi_amount, reason)?;
        self.store.transaction(|data| {
            data.employee(employee_id)?;
            data.save_advance(advance.clone());
            Ok(())
        })?;

        info!(
            advance_id = %advance.id,
            employee_id = %employee_id,
            amount = %amount,
            "Created advance"
        );
        Ok(advance)
    }

    /// Approves a pending advance so it is drawn against from the next generation.
    pub fn approve_advance(&self, advance_id: Uuid, approved_by: &str) -> EngineResult<Advance> {
        let advance = self.store.transaction(|data| {
            let advance = data.advance_mut(advance_id)?;
            advance.approve(approved_by, Utc::now())?;
            Ok(advance.clone())
        })?;
        info!(advance_id = %advance_id, approved_by = %approved_by, "Approved advance");
        Ok(advance)
    }

    /// Rejects a pending advance.
    pub fn reject_advance(&self, advance_id: Uuid, rejected_by: &str) -> EngineResult<Advance> {
        let advance = self.store.transaction(|data| {
            let advance = data.advance_mut(advance_id)?;
            advance.reject(rejected_by, Utc::now())?;
            Ok(advance.clone())
        })?;
        info!(advance_id = %advance_id, rejected_by = %rejected_by, "Rejected advance");
        Ok(advance)
    }

    /// Returns an advance.
    pub fn advance(&self, advance_id: Uuid) -> EngineResult<Advance> {
        self.store.read(|data| data.advance(advance_id).cloned())
    }

    /// Approves an installment, drawing it down from the advance balance.
    pub fn approve_installment(
        &self,
        installment_id: Uuid,
        approved_by: &str,
    ) -> EngineResult<InstallmentDecision> {
        self.decide_installment(installment_id, InstallmentAction::Approve(approved_by))
    }

    /// Rejects an installment. The advance balance is unchanged and the
    /// advance is suggested again in the next period.
    pub fn reject_installment(
        &self,
        installment_id: Uuid,
        rejected_by: &str,
    ) -> EngineResult<InstallmentDecision> {
        self.decide_installment(installment_id, InstallmentAction::Reject(rejected_by))
    }

    /// Changes the amount of a pending installment.
    pub fn edit_installment(
        &self,
        installment_id: Uuid,
        amount_paid: Decimal,
    ) -> EngineResult<InstallmentDecision> {
        self.decide_installment(installment_id, InstallmentAction::Edit(amount_paid))
    }

    /// Applies an installment action and recomposes the salary.
    ///
    /// The advance and salary are read inside the same transaction that
    /// writes the result, so concurrent approvals cannot overdraw an advance.
    fn decide_installment(
        &self,
        installment_id: Uuid,
        action: InstallmentAction<'_>,
    ) -> EngineResult<InstallmentDecision> {
        let now = Utc::now();
        let decision = self.store.transaction(|data| {
            let mut installment = data.installment(installment_id)?.clone();
            let mut advance = data.advance(installment.advance_id)?.clone();
            let salary = data.salary(installment.salary_id)?.clone();

            match action {
                InstallmentAction::Approve(by) => calculation::approve_installment(
                    &mut installment,
                    &mut advance,
                    &salary,
                    by,
                    now,
                )?,
                InstallmentAction::Reject(by) => {
                    calculation::reject_installment(&mut installment, &salary, by, now)?
                }
                InstallmentAction::Edit(amount) => {
                    calculation::edit_installment(&mut installment, &advance, &salary, amount)?
                }
            }

            data.save_installment(installment.clone());
            data.save_advance(advance.clone());
            let statement = recompose(data, salary.id, &self.policy, now)?;

            Ok(InstallmentDecision {
                installment,
                advance,
                statement,
            })
        })?;

        info!(
            installment_id = %installment_id,
            advance_id = %decision.advance.id,
            salary_id = %decision.installment.salary_id,
            status = ?decision.installment.status,
            amount_paid = %decision.installment.amount_paid,
            remaining_amount = %decision.advance.remaining_amount,
            "Installment updated"
        );
        Ok(decision)
    }
}
