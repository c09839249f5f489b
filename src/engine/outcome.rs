//! Results returned by engine workflows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Advance, AdvancePaymentInstallment, PayPeriod, Salary, SalaryStatement, SalaryStatus,
};

/// What generation did to an employee's salary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationAction {
    /// A new pending row was created.
    Created,
    /// The existing pending row was recomputed in place.
    Recomputed,
    /// A failed row was replaced by a new pending row.
    Replaced,
}

/// One generated salary.
#[derive(Debug, Clone, Serialize)]
pub struct SalarySummary {
    /// The salary row.
    pub salary_id: Uuid,
    /// The employee paid.
    pub employee_id: String,
    /// What happened to the row.
    pub action: GenerationAction,
    /// Net salary, 2 decimal places.
    pub net_salary: Decimal,
    /// Net salary in whole units.
    pub rounded_net_salary: Decimal,
    /// Installments still awaiting a decision.
    pub pending_installments: usize,
}

impl SalarySummary {
    pub(crate) fn from_statement(
        statement: &SalaryStatement,
        salary_id: Uuid,
        action: GenerationAction,
    ) -> Self {
        Self {
            salary_id,
            employee_id: statement.employee_id.clone(),
            action,
            net_salary: statement.net_salary,
            rounded_net_salary: statement.rounded_net_salary,
            pending_installments: statement.deductions.pending_count,
        }
    }
}

/// An employee whose salary could not be generated in a bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    /// The employee.
    pub employee_id: String,
    /// Why generation failed.
    pub error: String,
}

/// The result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    /// The month generated.
    pub period: PayPeriod,
    /// Salaries created, recomputed, or replaced.
    pub processed: usize,
    /// Employees skipped because their salary is processing or paid.
    pub skipped: usize,
    /// Per-salary results.
    pub salaries: Vec<SalarySummary>,
    /// Employees that failed.
    pub failures: Vec<GenerationFailure>,
}

/// Records for one employee and day when more than one exists.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceConflict {
    /// The employee.
    pub employee_id: String,
    /// The day with duplicate records.
    pub date: NaiveDate,
    /// The conflicting record ids.
    pub record_ids: Vec<Uuid>,
}

/// The result of an installment approve, reject, or edit.
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentDecision {
    /// The installment after the action.
    pub installment: AdvancePaymentInstallment,
    /// The advance after the action.
    pub advance: Advance,
    /// The recomposed salary.
    pub statement: SalaryStatement,
}

/// The result of a salary status transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeOutcome {
    /// The salary after the transition.
    pub salary: Salary,
    /// True when a paid salary belongs to a partially inactive employee,
    /// who the operator may now mark inactive.
    pub suggest_mark_inactive: bool,
}

/// One salary's result in a bulk status transition.
#[derive(Debug, Clone, Serialize)]
pub struct BulkStatusItem {
    /// The salary.
    pub salary_id: Uuid,
    /// Whether the transition was applied.
    pub updated: bool,
    /// The status after the attempt, if the salary exists.
    pub status: Option<SalaryStatus>,
    /// Paid hint, as in [`StatusChangeOutcome`].
    pub suggest_mark_inactive: bool,
    /// Why the transition was refused.
    pub error: Option<String>,
}

/// The result of a bulk status transition.
#[derive(Debug, Clone, Serialize)]
pub struct BulkStatusOutcome {
    /// Salaries transitioned.
    pub updated: usize,
    /// Salaries refused.
    pub failed: usize,
    /// Per-salary results, in request order.
    pub results: Vec<BulkStatusItem>,
}

/// The result of a referral processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralRunSummary {
    /// The month processed.
    pub period: PayPeriod,
    /// Referral bonuses folded into salaries.
    pub applied: usize,
    /// Salaries that received bonuses.
    pub salary_ids: Vec<Uuid>,
    /// Referrers skipped because their salary is frozen.
    pub skipped: usize,
    /// Referrers whose salary could not be generated.
    pub failures: Vec<GenerationFailure>,
}

/// The result of undoing referral bonuses on a salary.
#[derive(Debug, Clone, Serialize)]
pub struct UndoReferralsOutcome {
    /// Referrals unlinked from the salary.
    pub reverted: usize,
    /// The recomposed salary.
    pub statement: SalaryStatement,
}
