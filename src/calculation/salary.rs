//! The salary pipeline.
//!
//! Runs aggregation, earned leave, earnings, deductions, and net composition
//! in order and assembles a [`SalaryStatement`] with the full audit trace.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::PayrollPolicy;
use crate::models::{
    AdvancePaymentInstallment, AttendanceRecord, AttendanceSummary, AuditStep, AuditTrace,
    AuditWarning, PayPeriod, Salary, SalaryStatement, SalaryStatus, StatementSource,
};

use super::{
    aggregate_attendance, calculate_earned_leaves, calculate_earnings, compose_net_salary,
    reconcile_deductions,
};

/// Everything the live pipeline reads for one employee and month.
#[derive(Debug, Clone)]
pub struct SalaryInput<'a> {
    /// The salary row being recomputed, if one exists.
    pub salary_id: Option<Uuid>,
    /// Status of that row.
    pub status: Option<SalaryStatus>,
    /// The employee being paid.
    pub employee_id: &'a str,
    /// The month being paid.
    pub period: PayPeriod,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Manual and referral bonuses.
    pub other_bonuses: Decimal,
    /// Flat deductions other than advances.
    pub other_deductions: Decimal,
    /// Attendance records; unapproved and out-of-period ones are ignored.
    pub attendance: &'a [AttendanceRecord],
    /// Installments linked to the salary.
    pub installments: &'a [AdvancePaymentInstallment],
}

impl<'a> SalaryInput<'a> {
    /// Builds the input for recomputing an existing salary row.
    pub fn for_salary(
        salary: &'a Salary,
        attendance: &'a [AttendanceRecord],
        installments: &'a [AdvancePaymentInstallment],
    ) -> Self {
        Self {
            salary_id: Some(salary.id),
            status: Some(salary.status),
            employee_id: &salary.employee_id,
            period: salary.period,
            base_salary: salary.base_salary,
            other_bonuses: salary.other_bonuses,
            other_deductions: salary.other_deductions,
            attendance,
            installments,
        }
    }
}

/// Computes a salary statement from live attendance.
///
/// This is a pure function: it does not persist anything. Callers that own
/// a pending salary row write the result back with
/// [`write_snapshot`](super::write_snapshot).
pub fn calculate_salary(input: &SalaryInput<'_>, policy: &PayrollPolicy) -> SalaryStatement {
    let start_time = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings = Vec::new();

    let aggregation =
        aggregate_attendance(input.attendance, input.employee_id, input.period, policy, 1);
    steps.push(aggregation.audit_step);
    warnings.extend(aggregation.warnings);

    finish_statement(
        StatementParts {
            salary_id: input.salary_id,
            status: input.status,
            employee_id: input.employee_id,
            period: input.period,
            base_salary: input.base_salary,
            other_bonuses: input.other_bonuses,
            other_deductions: input.other_deductions,
            installments: input.installments,
            source: StatementSource::Live,
            summary: aggregation.summary,
            leaves_earned: None,
        },
        steps,
        warnings,
        policy,
        start_time,
    )
}

/// Derives a statement from the stored components of a frozen salary.
///
/// Attendance is not re-read, so later attendance edits do not change the
/// result.
pub fn statement_from_snapshot(
    salary: &Salary,
    installments: &[AdvancePaymentInstallment],
    policy: &PayrollPolicy,
) -> SalaryStatement {
    let start_time = Instant::now();

    let summary = AttendanceSummary {
        total_days_in_month: salary.period.days_in_month(),
        regular_days: salary.regular_days,
        half_days: salary.half_days,
        overtime_days: salary.overtime_days,
        leave_days: salary.leave_days,
        weekly_off_days: 0,
        work_from_home_days: 0,
        present_days: salary.present_days,
    };

    let snapshot_step = AuditStep {
        step_number: 1,
        rule_id: "snapshot".to_string(),
        rule_name: "Frozen Snapshot".to_string(),
        input: serde_json::json!({
            "salary_id": salary.id.to_string(),
            "status": salary.status.as_str()
        }),
        output: serde_json::json!({
            "present_days": salary.present_days.normalize().to_string(),
            "overtime_days": salary.overtime_days,
            "leaves_earned": salary.leaves_earned
        }),
        reasoning: format!(
            "Salary is {}; using stored attendance figures",
            salary.status.as_str()
        ),
    };

    finish_statement(
        StatementParts {
            salary_id: Some(salary.id),
            status: Some(salary.status),
            employee_id: &salary.employee_id,
            period: salary.period,
            base_salary: salary.base_salary,
            other_bonuses: salary.other_bonuses,
            other_deductions: salary.other_deductions,
            installments,
            source: StatementSource::Snapshot,
            summary,
            leaves_earned: Some(salary.leaves_earned),
        },
        vec![snapshot_step],
        Vec::new(),
        policy,
        start_time,
    )
}

struct StatementParts<'a> {
    salary_id: Option<Uuid>,
    status: Option<SalaryStatus>,
    employee_id: &'a str,
    period: PayPeriod,
    base_salary: Decimal,
    other_bonuses: Decimal,
    other_deductions: Decimal,
    installments: &'a [AdvancePaymentInstallment],
    source: StatementSource,
    summary: AttendanceSummary,
    /// Stored leaves for snapshots; live runs evaluate the tiers.
    leaves_earned: Option<u32>,
}

fn finish_statement(
    parts: StatementParts<'_>,
    mut steps: Vec<AuditStep>,
    mut warnings: Vec<AuditWarning>,
    policy: &PayrollPolicy,
    start_time: Instant,
) -> SalaryStatement {
    let mut step_number = steps.len() as u32 + 1;

    let leaves_earned = match parts.leaves_earned {
        Some(leaves) => leaves,
        None => {
            let leave = calculate_earned_leaves(parts.summary.present_days, policy, step_number);
            steps.push(leave.audit_step);
            step_number += 1;
            leave.leaves_earned
        }
    };

    let earnings = calculate_earnings(
        parts.base_salary,
        &parts.summary,
        leaves_earned,
        parts.other_bonuses,
        policy,
        step_number,
    );
    steps.push(earnings.audit_step);
    step_number += 1;

    let deductions = reconcile_deductions(parts.installments, parts.other_deductions, step_number);
    steps.push(deductions.audit_step);
    warnings.extend(deductions.warnings);
    step_number += 1;

    let net = compose_net_salary(&earnings.earnings, &deductions.deductions, step_number);
    steps.push(net.audit_step);
    warnings.extend(net.warnings);

    SalaryStatement {
        statement_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        salary_id: parts.salary_id,
        status: parts.status,
        employee_id: parts.employee_id.to_string(),
        period: parts.period,
        base_salary: parts.base_salary,
        source: parts.source,
        attendance: parts.summary,
        earnings: earnings.earnings,
        deductions: deductions.deductions,
        net_salary: net.net_salary,
        rounded_net_salary: net.rounded_net_salary,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    }
}
