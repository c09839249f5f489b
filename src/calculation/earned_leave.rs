//! Earned leave step function.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::AuditStep;

/// The result of evaluating the earned-leave tiers.
#[derive(Debug, Clone)]
pub struct EarnedLeaveResult {
    /// Paid leaves earned for the month.
    pub leaves_earned: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns the leaves earned for `present_days` under the policy's tiers.
///
/// The highest tier whose threshold is reached wins; there is no
/// interpolation between tiers. With the default tiers, 25 present days earn
/// 2 leaves and 15 earn 1.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_earned_leaves;
/// use payroll_engine::config::PayrollPolicy;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let policy = PayrollPolicy::default();
/// let result = calculate_earned_leaves(Decimal::from_str("24.5").unwrap(), &policy, 1);
/// assert_eq!(result.leaves_earned, 1);
/// ```
pub fn calculate_earned_leaves(
    present_days: Decimal,
    policy: &PayrollPolicy,
    step_number: u32,
) -> EarnedLeaveResult {
    let tier = policy
        .leave_tiers
        .iter()
        .filter(|t| present_days >= t.min_present_days)
        .max_by_key(|t| t.min_present_days);

    let leaves_earned = tier.map(|t| t.leaves).unwrap_or(0);

    let reasoning = match tier {
        Some(t) => format!(
            "{} present days >= {} earns {} leave(s)",
            present_days.normalize(),
            t.min_present_days.normalize(),
            t.leaves
        ),
        None => format!(
            "{} present days is below every leave tier",
            present_days.normalize()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "earned_leave".to_string(),
        rule_name: "Earned Leave".to_string(),
        input: serde_json::json!({
            "present_days": present_days.normalize().to_string(),
            "tiers": policy
                .leave_tiers
                .iter()
                .map(|t| serde_json::json!({
                    "min_present_days": t.min_present_days.normalize().to_string(),
                    "leaves": t.leaves
                }))
                .collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "leaves_earned": leaves_earned
        }),
        reasoning,
    };

    EarnedLeaveResult {
        leaves_earned,
        audit_step,
    }
}
