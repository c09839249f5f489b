//! Salary advance and installment models.
//!
//! An [`Advance`] is a loan repaid through [`AdvancePaymentInstallment`]s,
//! one per salary cycle it is drawn against.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Decision state of an advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    /// Requested, awaiting a decision.
    Pending,
    /// Granted and being repaid.
    Approved,
    /// Refused.
    Rejected,
    /// Fully repaid.
    Settled,
}

/// A loan granted to an employee and repaid from salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    /// Unique identifier for the advance.
    pub id: Uuid,
    /// The borrowing employee.
    pub employee_id: String,
    /// The principal.
    pub amount: Decimal,
    /// Planned deduction per salary cycle.
    pub emi_amount: Decimal,
    /// Principal not yet covered by approved installments.
    pub remaining_amount: Decimal,
    /// Free-text purpose of the advance.
    #[serde(default)]
    pub reason: Option<String>,
    /// Decision state.
    pub status: AdvanceStatus,
    /// Whether the principal has been fully repaid.
    pub is_settled: bool,
    /// Who decided on the request.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the request was decided.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl Advance {
    /// Creates a pending advance request after validating the amounts.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Advance, AdvanceStatus};
    /// use rust_decimal::Decimal;
    ///
    /// let advance = Advance::new("emp_001", Decimal::new(6000, 0), Decimal::new(2000, 0), None).unwrap();
    /// assert_eq!(advance.status, AdvanceStatus::Pending);
    /// assert_eq!(advance.remaining_amount, Decimal::new(6000, 0));
    ///
    /// assert!(Advance::new("emp_001", Decimal::new(1000, 0), Decimal::new(2000, 0), None).is_err());
    /// ```
    pub fn new(
        employee_id: impl Into<String>,
        amount: Decimal,
        emi_amount: Decimal,
        reason: Option<String>,
    ) -> EngineResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::validation("amount", "must be greater than zero"));
        }
        if emi_amount <= Decimal::ZERO {
            return Err(EngineError::validation(
                "emi_amount",
                "must be greater than zero",
            ));
        }
        if emi_amount > amount {
            return Err(EngineError::validation(
                "emi_amount",
                format!("{} exceeds the advance amount {}", emi_amount, amount),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            amount,
            emi_amount,
            remaining_amount: amount,
            reason,
            status: AdvanceStatus::Pending,
            is_settled: false,
            approved_by: None,
            approved_at: None,
        })
    }

    /// Returns true if a new installment may be drawn against this advance.
    pub fn accepts_installments(&self) -> bool {
        self.status == AdvanceStatus::Approved
            && !self.is_settled
            && self.remaining_amount > Decimal::ZERO
    }

    /// The installment proposed for the next salary cycle: `min(emi, remaining)`.
    pub fn suggested_installment(&self) -> Decimal {
        self.emi_amount.min(self.remaining_amount)
    }

    /// Grants a pending advance.
    pub fn approve(&mut self, approved_by: &str, at: DateTime<Utc>) -> EngineResult<()> {
        self.decide(AdvanceStatus::Approved, approved_by, at)
    }

    /// Refuses a pending advance.
    pub fn reject(&mut self, rejected_by: &str, at: DateTime<Utc>) -> EngineResult<()> {
        self.decide(AdvanceStatus::Rejected, rejected_by, at)
    }

    fn decide(
        &mut self,
        status: AdvanceStatus,
        decided_by: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        if self.status != AdvanceStatus::Pending {
            return Err(EngineError::conflict(format!(
                "advance {} has already been decided",
                self.id
            )));
        }
        self.status = status;
        self.approved_by = Some(decided_by.to_string());
        self.approved_at = Some(at);
        Ok(())
    }

    /// Reduces the remaining balance by an approved installment.
    ///
    /// Fails with a validation error if the installment exceeds the balance,
    /// so approved installments can never sum past the principal.
    pub fn apply_installment(&mut self, amount: Decimal) -> EngineResult<()> {
        if amount > self.remaining_amount {
            return Err(EngineError::validation(
                "amount_paid",
                format!(
                    "installment {} exceeds remaining advance balance {}",
                    amount, self.remaining_amount
                ),
            ));
        }
        self.remaining_amount -= amount;
        if self.remaining_amount <= Decimal::ZERO {
            self.is_settled = true;
            self.status = AdvanceStatus::Settled;
        }
        Ok(())
    }
}

/// Decision state of a single installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Proposed deduction awaiting HR sign-off.
    Pending,
    /// Signed off; reduces pay and the advance balance.
    Approved,
    /// Refused; no effect on pay or the advance.
    Rejected,
}

/// Links one advance to one salary period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancePaymentInstallment {
    /// Unique identifier for the installment.
    pub id: Uuid,
    /// The advance being repaid.
    pub advance_id: Uuid,
    /// The salary the deduction is taken from.
    pub salary_id: Uuid,
    /// The employee repaying.
    pub employee_id: String,
    /// Amount deducted from the salary.
    pub amount_paid: Decimal,
    /// Decision state.
    pub status: InstallmentStatus,
    /// Who approved or rejected the installment.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the installment was approved or rejected.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl AdvancePaymentInstallment {
    /// Creates a pending installment proposal against a salary.
    pub fn pending(advance: &Advance, salary_id: Uuid, amount_paid: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            advance_id: advance.id,
            salary_id,
            employee_id: advance.employee_id.clone(),
            amount_paid,
            status: InstallmentStatus::Pending,
            approved_by: None,
            approved_at: None,
        }
    }

    /// Returns true if the installment is still awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.status == InstallmentStatus::Pending
    }

    /// Returns true if the installment reduces pay.
    pub fn is_approved(&self) -> bool {
        self.status == InstallmentStatus::Approved
    }
}
