//! Earnings calculation.
//!
//! Turns the attendance buckets and base salary into the per-day rate and
//! every earning component. All arithmetic runs on the unrounded per-day
//! rate; components are rounded to 2 decimal places only when reported.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::{AttendanceSummary, AuditStep, Earnings};

use super::money::round_money;

/// The result of calculating earnings, including the audit step.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// The rounded earning components.
    pub earnings: Earnings,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the earning components for one month.
///
/// * `per_day_salary` = `base_salary / total_days_in_month`
/// * `present_days_salary` = `present_days x per_day`
/// * `overtime_salary` = `overtime_days x overtime_premium x per_day`
/// * `leave_salary` = `leaves_earned x per_day`
/// * `base_salary_earned` = the sum of the above plus `other_bonuses`
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_earnings;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::AttendanceSummary;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let mut summary = AttendanceSummary::empty(28);
/// summary.regular_days = 24;
/// summary.half_days = 2;
/// summary.overtime_days = 1;
/// summary.present_days = Decimal::from(26);
///
/// let result = calculate_earnings(
///     Decimal::from(30000),
///     &summary,
///     2,
///     Decimal::ZERO,
///     &PayrollPolicy::default(),
///     1,
/// );
/// assert_eq!(result.earnings.per_day_salary, Decimal::from_str("1071.43").unwrap());
/// assert_eq!(result.earnings.base_salary_earned, Decimal::from_str("30535.71").unwrap());
/// ```
pub fn calculate_earnings(
    base_salary: Decimal,
    summary: &AttendanceSummary,
    leaves_earned: u32,
    other_bonuses: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> EarningsResult {
    let per_day = if summary.total_days_in_month == 0 {
        Decimal::ZERO
    } else {
        base_salary / Decimal::from(summary.total_days_in_month)
    };

    let present_days_salary = summary.present_days * per_day;
    let overtime_salary = Decimal::from(summary.overtime_days) * policy.overtime_premium * per_day;
    let leave_salary = Decimal::from(leaves_earned) * per_day;
    let base_salary_earned = present_days_salary + overtime_salary + leave_salary + other_bonuses;

    let earnings = Earnings {
        per_day_salary: round_money(per_day),
        present_days_salary: round_money(present_days_salary),
        overtime_salary: round_money(overtime_salary),
        leaves_earned,
        leave_salary: round_money(leave_salary),
        other_bonuses: round_money(other_bonuses),
        base_salary_earned: round_money(base_salary_earned),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "earnings".to_string(),
        rule_name: "Earnings".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "total_days_in_month": summary.total_days_in_month,
            "present_days": summary.present_days.normalize().to_string(),
            "overtime_days": summary.overtime_days,
            "leaves_earned": leaves_earned,
            "other_bonuses": other_bonuses.normalize().to_string(),
            "overtime_premium": policy.overtime_premium.normalize().to_string()
        }),
        output: serde_json::json!({
            "per_day_salary": earnings.per_day_salary.to_string(),
            "present_days_salary": earnings.present_days_salary.to_string(),
            "overtime_salary": earnings.overtime_salary.to_string(),
            "leave_salary": earnings.leave_salary.to_string(),
            "base_salary_earned": earnings.base_salary_earned.to_string()
        }),
        reasoning: format!(
            "{} / {} days = {} per day; {} present + {} overtime + {} leave + {} bonuses = {}",
            base_salary.normalize(),
            summary.total_days_in_month,
            earnings.per_day_salary,
            earnings.present_days_salary,
            earnings.overtime_salary,
            earnings.leave_salary,
            earnings.other_bonuses,
            earnings.base_salary_earned
        ),
    };

    EarningsResult {
        earnings,
        audit_step,
    }
}
