//! Salary snapshot model and its status machine.
//!
//! A [`Salary`] is the persisted view of one employee's pay for one
//! [`PayPeriod`]. While [`SalaryStatus::Pending`] it is a cache that is
//! overwritten whenever an upstream fact changes; from
//! [`SalaryStatus::Processing`] onwards it is frozen.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::PayPeriod;

/// Lifecycle state of a salary.
///
/// ```text
/// Pending -> Processing -> Paid
///                       -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryStatus {
    /// Open for recomputation and HR adjustments.
    Pending,
    /// Committed to payroll; snapshot frozen.
    Processing,
    /// Paid out. Terminal.
    Paid,
    /// Payment failed. Terminal; may be regenerated as a new attempt.
    Failed,
}

impl SalaryStatus {
    /// Returns true if `next` is a supported transition from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::SalaryStatus;
    ///
    /// assert!(SalaryStatus::Pending.can_transition_to(SalaryStatus::Processing));
    /// assert!(!SalaryStatus::Processing.can_transition_to(SalaryStatus::Pending));
    /// assert!(!SalaryStatus::Pending.can_transition_to(SalaryStatus::Paid));
    /// ```
    pub fn can_transition_to(self, next: SalaryStatus) -> bool {
        matches!(
            (self, next),
            (SalaryStatus::Pending, SalaryStatus::Processing)
                | (SalaryStatus::Processing, SalaryStatus::Paid)
                | (SalaryStatus::Processing, SalaryStatus::Failed)
        )
    }

    /// Returns true once the snapshot may no longer be recomputed.
    pub fn is_frozen(self) -> bool {
        self != SalaryStatus::Pending
    }

    /// Lowercase name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SalaryStatus::Pending => "pending",
            SalaryStatus::Processing => "processing",
            SalaryStatus::Paid => "paid",
            SalaryStatus::Failed => "failed",
        }
    }
}

/// One employee's salary snapshot for one month.
///
/// Net salary is deliberately absent: it is always derived from these
/// components by the calculation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    /// Unique identifier for the salary row.
    pub id: Uuid,
    /// The employee being paid.
    pub employee_id: String,
    /// The month being paid.
    pub period: PayPeriod,
    /// The employee's configured salary at generation time.
    pub base_salary: Decimal,
    /// Present days, half days weighted.
    pub present_days: Decimal,
    /// Full days without overtime.
    pub regular_days: u32,
    /// Half days.
    pub half_days: u32,
    /// Overtime days.
    pub overtime_days: u32,
    /// Days not present.
    pub leave_days: u32,
    /// Paid leaves earned from attendance.
    pub leaves_earned: u32,
    /// Pay for earned leaves.
    pub leave_salary: Decimal,
    /// Overtime premium on top of the regular day.
    pub overtime_bonus: Decimal,
    /// Manual and referral bonuses.
    pub other_bonuses: Decimal,
    /// Flat deductions other than advances.
    pub other_deductions: Decimal,
    /// Sum of approved installments, refreshed on every recomposition.
    pub advance_deduction: Decimal,
    /// Lifecycle state.
    pub status: SalaryStatus,
    /// When the salary was paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl Salary {
    /// Creates an empty pending salary for the given employee and period.
    pub fn new_pending(
        employee_id: impl Into<String>,
        period: PayPeriod,
        base_salary: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            period,
            base_salary,
            present_days: Decimal::ZERO,
            regular_days: 0,
            half_days: 0,
            overtime_days: 0,
            leave_days: 0,
            leaves_earned: 0,
            leave_salary: Decimal::ZERO,
            overtime_bonus: Decimal::ZERO,
            other_bonuses: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            advance_deduction: Decimal::ZERO,
            status: SalaryStatus::Pending,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true while the snapshot is still open for recomputation.
    pub fn is_pending(&self) -> bool {
        self.status == SalaryStatus::Pending
    }

    /// Fails with a conflict unless the salary is pending.
    pub fn ensure_pending(&self, action: &str) -> EngineResult<()> {
        if !self.is_pending() {
            return Err(EngineError::conflict(format!(
                "cannot {}: salary {} is {}",
                action,
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }

    /// Moves the salary along the status machine.
    ///
    /// Preconditions that depend on other entities (pending installments,
    /// attendance conflicts) are checked by the caller.
    pub fn transition_to(&mut self, next: SalaryStatus, now: DateTime<Utc>) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::conflict(format!(
                "salary {} cannot move from {} to {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        if next == SalaryStatus::Paid {
            self.paid_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Adds non-negative bonus and deduction amounts to a pending salary.
    pub fn apply_adjustment(
        &mut self,
        bonus_amount: Decimal,
        deduction_amount: Decimal,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.ensure_pending("adjust salary")?;
        if bonus_amount < Decimal::ZERO {
            return Err(EngineError::validation("bonus_amount", "must not be negative"));
        }
        if deduction_amount < Decimal::ZERO {
            return Err(EngineError::validation(
                "deduction_amount",
                "must not be negative",
            ));
        }
        if bonus_amount.is_zero() && deduction_amount.is_zero() {
            return Err(EngineError::validation(
                "bonus_amount",
                "an adjustment needs a non-zero bonus or deduction",
            ));
        }
        self.other_bonuses += bonus_amount;
        self.other_deductions += deduction_amount;
        self.updated_at = now;
        Ok(())
    }
}
