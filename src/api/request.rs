//! Request types for the payroll API.
//!
//! Each body is checked with `validate` before it reaches the engine, so
//! shape errors come back as `VALIDATION_ERROR` without touching the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{AttendanceSubmission, NewReferral};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceStatus, Employee, EmployeeStatus, PayPeriod, SalaryStatus};

fn require_text(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Body for `POST /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEmployeeRequest {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Configured monthly salary.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// Lifecycle state; new employees default to active.
    #[serde(default = "default_employee_status")]
    pub status: EmployeeStatus,
}

fn default_employee_status() -> EmployeeStatus {
    EmployeeStatus::Active
}

impl RegisterEmployeeRequest {
    /// Checks required fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_text("id", &self.id)?;
        require_text("name", &self.name)
    }
}

impl From<RegisterEmployeeRequest> for Employee {
    fn from(req: RegisterEmployeeRequest) -> Self {
        Employee {
            id: req.id,
            name: req.name,
            base_salary: req.base_salary,
            status: req.status,
        }
    }
}

/// Body for `POST /attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The employee.
    pub employee_id: String,
    /// The day.
    pub date: NaiveDate,
    /// Whether the employee was present.
    #[serde(default = "default_true")]
    pub is_present: bool,
    /// Present for half the day.
    #[serde(default)]
    pub is_half_day: bool,
    /// Worked overtime.
    #[serde(default)]
    pub overtime: bool,
    /// The day is the employee's weekly off.
    #[serde(default)]
    pub is_weekly_off: bool,
    /// Worked from home.
    #[serde(default)]
    pub is_work_from_home: bool,
    /// Verification state; submissions start unverified unless HR says otherwise.
    #[serde(default = "default_attendance_status")]
    pub status: AttendanceStatus,
}

fn default_true() -> bool {
    true
}

fn default_attendance_status() -> AttendanceStatus {
    AttendanceStatus::PendingVerification
}

impl AttendanceRequest {
    /// Checks required fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_text("employee_id", &self.employee_id)
    }
}

impl From<AttendanceRequest> for AttendanceSubmission {
    fn from(req: AttendanceRequest) -> Self {
        AttendanceSubmission {
            employee_id: req.employee_id,
            date: req.date,
            is_present: req.is_present,
            is_half_day: req.is_half_day,
            overtime: req.overtime,
            is_weekly_off: req.is_weekly_off,
            is_work_from_home: req.is_work_from_home,
            status: req.status,
        }
    }
}

/// Body for `PATCH /attendance/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStatusRequest {
    /// The new verification state.
    pub status: AttendanceStatus,
}

/// A month and year, as a query string or body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// Month, 1 to 12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl PeriodRequest {
    /// Builds the validated pay period.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::new(self.month, self.year)
    }
}

/// Body for `POST /advances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdvanceRequest {
    /// The employee requesting the advance.
    pub employee_id: String,
    /// Principal requested.
    pub amount: Decimal,
    /// Planned installment per period.
    pub emi_amount: Decimal,
    /// Free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl CreateAdvanceRequest {
    /// Checks required fields; amounts are checked by the engine.
    pub fn validate(&self) -> EngineResult<()> {
        require_text("employee_id", &self.employee_id)
    }
}

/// Body for the approve and reject endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Who made the decision.
    pub decided_by: String,
}

impl DecisionRequest {
    /// Checks required fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_text("decided_by", &self.decided_by)
    }
}

/// Body for `POST /salaries/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSalariesRequest {
    /// Month, 1 to 12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Limit generation to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}

impl GenerateSalariesRequest {
    /// Builds the validated pay period.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::new(self.month, self.year)
    }
}

/// Body for `POST /salaries/:id/adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    /// Amount added to `other_bonuses`.
    #[serde(default)]
    pub bonus_amount: Decimal,
    /// Amount added to `other_deductions`.
    #[serde(default)]
    pub deduction_amount: Decimal,
}

/// Body for `PATCH /salaries/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryStatusRequest {
    /// The requested status.
    pub status: SalaryStatus,
}

/// Body for `PATCH /salaries/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSalaryStatusRequest {
    /// Salaries to move.
    pub salary_ids: Vec<Uuid>,
    /// The requested status.
    pub status: SalaryStatus,
}

impl BulkSalaryStatusRequest {
    /// Checks that at least one salary is named.
    pub fn validate(&self) -> EngineResult<()> {
        if self.salary_ids.is_empty() {
            return Err(EngineError::validation("salary_ids", "must not be empty"));
        }
        Ok(())
    }
}

/// Body for `PUT /installments/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditInstallmentRequest {
    /// The new installment amount.
    pub amount_paid: Decimal,
}

/// Body for `POST /referrals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRequest {
    /// The employee who made the referral.
    pub referrer_id: String,
    /// The hire.
    pub referred_employee_id: String,
    /// Bonus paid to the referrer.
    pub bonus_amount: Decimal,
    /// First day the bonus may be paid.
    pub eligible_at: NaiveDate,
}

impl ReferralRequest {
    /// Checks required fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_text("referrer_id", &self.referrer_id)?;
        require_text("referred_employee_id", &self.referred_employee_id)
    }
}

impl From<ReferralRequest> for NewReferral {
    fn from(req: ReferralRequest) -> Self {
        NewReferral {
            referrer_id: req.referrer_id,
            referred_employee_id: req.referred_employee_id,
            bonus_amount: req.bonus_amount,
            eligible_at: req.eligible_at,
        }
    }
}
