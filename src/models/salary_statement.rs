//! Salary statement models for the payroll engine.
//!
//! This module contains the [`SalaryStatement`] type and its associated structures
//! that capture every output of the salary pipeline: attendance buckets,
//! earnings, deductions, net salary, and an audit trace. Payslip and report
//! renderers consume this type instead of a stored net figure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InstallmentStatus, PayPeriod, SalaryStatus};

/// Day-count buckets for one employee and month.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendanceSummary;
/// use rust_decimal::Decimal;
///
/// let summary = AttendanceSummary::empty(28);
/// assert_eq!(summary.present_days, Decimal::ZERO);
/// assert_eq!(summary.total_days_in_month, 28);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Calendar days in the month.
    pub total_days_in_month: u32,
    /// Present full days without overtime.
    pub regular_days: u32,
    /// Present half days.
    pub half_days: u32,
    /// Present days with overtime.
    pub overtime_days: u32,
    /// Days not present.
    pub leave_days: u32,
    /// Approved days flagged as weekly off (informational).
    pub weekly_off_days: u32,
    /// Approved days worked from home (informational).
    pub work_from_home_days: u32,
    /// `regular + overtime + half_days * half_day_weight`.
    pub present_days: Decimal,
}

impl AttendanceSummary {
    /// An all-zero summary for a month with no approved attendance.
    pub fn empty(total_days_in_month: u32) -> Self {
        Self {
            total_days_in_month,
            regular_days: 0,
            half_days: 0,
            overtime_days: 0,
            leave_days: 0,
            weekly_off_days: 0,
            work_from_home_days: 0,
            present_days: Decimal::ZERO,
        }
    }
}

/// Earning components, rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earnings {
    /// Base salary divided by the days in the month.
    pub per_day_salary: Decimal,
    /// Present days times the per-day rate.
    pub present_days_salary: Decimal,
    /// Overtime premium on top of the regular day.
    pub overtime_salary: Decimal,
    /// Paid leaves earned from attendance.
    pub leaves_earned: u32,
    /// Earned leaves times the per-day rate.
    pub leave_salary: Decimal,
    /// Manual and referral bonuses.
    pub other_bonuses: Decimal,
    /// Sum of all earning components.
    pub base_salary_earned: Decimal,
}

/// One installment as it appears on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The installment.
    pub installment_id: Uuid,
    /// The advance it repays.
    pub advance_id: Uuid,
    /// Proposed or approved amount.
    pub amount: Decimal,
    /// Decision state; only approved lines reduce pay.
    pub status: InstallmentStatus,
    /// When the installment was decided.
    pub approved_at: Option<DateTime<Utc>>,
}

/// Deduction components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Sum of approved installments.
    pub total_advance_deductions: Decimal,
    /// Flat deductions other than advances.
    pub other_deductions: Decimal,
    /// `total_advance_deductions + other_deductions`.
    pub total_deductions: Decimal,
    /// Number of approved installments.
    pub approved_count: usize,
    /// Number of installments awaiting a decision.
    pub pending_count: usize,
    /// Every installment linked to the salary.
    pub lines: Vec<DeductionLine>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Whether a statement was computed from live attendance or a frozen snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementSource {
    /// Recomputed from approved attendance records.
    Live,
    /// Derived from the persisted snapshot of a frozen salary.
    Snapshot,
}

/// The complete result of a salary computation.
///
/// `net_salary` is always `earnings.base_salary_earned - deductions.total_deductions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryStatement {
    /// Unique identifier for this computation.
    pub statement_id: Uuid,
    /// When the computation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the computation.
    pub engine_version: String,
    /// The salary row this statement describes, if one exists.
    pub salary_id: Option<Uuid>,
    /// The status of that salary row.
    pub status: Option<SalaryStatus>,
    /// The employee being paid.
    pub employee_id: String,
    /// The month being paid.
    pub period: PayPeriod,
    /// The configured base salary used.
    pub base_salary: Decimal,
    /// Where the attendance figures came from.
    pub source: StatementSource,
    /// Attendance buckets.
    pub attendance: AttendanceSummary,
    /// Earning components.
    pub earnings: Earnings,
    /// Deduction components.
    pub deductions: Deductions,
    /// Payable amount, 2 decimal places.
    pub net_salary: Decimal,
    /// Payable amount rounded to whole units.
    pub rounded_net_salary: Decimal,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
