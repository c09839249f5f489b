//! Net salary composition.
//!
//! The net figure is never stored; it is always derived from the earning and
//! deduction components by [`compose_net_salary`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{AttendanceSummary, AuditStep, AuditWarning, Deductions, Earnings, Salary};

use super::money::{round_money, round_whole};

/// The result of composing the net salary, including the audit step.
#[derive(Debug, Clone)]
pub struct NetSalaryResult {
    /// `base_salary_earned - total_deductions`, 2 decimal places.
    pub net_salary: Decimal,
    /// The net salary rounded to whole units.
    pub rounded_net_salary: Decimal,
    /// `NEGATIVE_NET_SALARY` when deductions exceed earnings.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Derives the payable amount from earnings and deductions.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compose_net_salary;
/// use payroll_engine::models::{Deductions, Earnings};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let earnings = Earnings {
///     per_day_salary: Decimal::from(1000),
///     present_days_salary: Decimal::from(20000),
///     overtime_salary: Decimal::ZERO,
///     leaves_earned: 1,
///     leave_salary: Decimal::from(1000),
///     other_bonuses: Decimal::ZERO,
///     base_salary_earned: Decimal::from(21000),
/// };
/// let deductions = Deductions {
///     total_advance_deductions: Decimal::from(1500),
///     other_deductions: Decimal::from_str("99.50").unwrap(),
///     total_deductions: Decimal::from_str("1599.50").unwrap(),
///     approved_count: 1,
///     pending_count: 0,
///     lines: vec![],
/// };
///
/// let result = compose_net_salary(&earnings, &deductions, 1);
/// assert_eq!(result.net_salary, Decimal::from_str("19400.50").unwrap());
/// assert_eq!(result.rounded_net_salary, Decimal::from(19401));
/// ```
pub fn compose_net_salary(
    earnings: &Earnings,
    deductions: &Deductions,
    step_number: u32,
) -> NetSalaryResult {
    let net_salary = round_money(earnings.base_salary_earned - deductions.total_deductions);
    let rounded_net_salary = round_whole(net_salary);

    let mut warnings = Vec::new();
    if net_salary < Decimal::ZERO {
        warnings.push(AuditWarning::new(
            "NEGATIVE_NET_SALARY",
            format!(
                "Deductions {} exceed earnings {}",
                deductions.total_deductions, earnings.base_salary_earned
            ),
            "high",
        ));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "base_salary_earned": earnings.base_salary_earned.to_string(),
            "total_deductions": deductions.total_deductions.to_string()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.to_string(),
            "rounded_net_salary": rounded_net_salary.to_string()
        }),
        reasoning: format!(
            "{} - {} = {}",
            earnings.base_salary_earned, deductions.total_deductions, net_salary
        ),
    };

    NetSalaryResult {
        net_salary,
        rounded_net_salary,
        warnings,
        audit_step,
    }
}

/// Writes the derived components of a computation onto a salary row.
///
/// `other_bonuses` and `other_deductions` are inputs to the pipeline and are
/// left as they are.
pub fn write_snapshot(
    salary: &mut Salary,
    summary: &AttendanceSummary,
    earnings: &Earnings,
    deductions: &Deductions,
    now: DateTime<Utc>,
) {
    salary.present_days = summary.present_days;
    salary.regular_days = summary.regular_days;
    salary.half_days = summary.half_days;
    salary.overtime_days = summary.overtime_days;
    salary.leave_days = summary.leave_days;
    salary.leaves_earned = earnings.leaves_earned;
    salary.leave_salary = earnings.leave_salary;
    salary.overtime_bonus = earnings.overtime_salary;
    salary.advance_deduction = deductions.total_advance_deductions;
    salary.updated_at = now;
}
