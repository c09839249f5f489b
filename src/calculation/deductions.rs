//! Deduction reconciliation.
//!
//! Only approved installments reduce pay. Pending installments are listed on
//! the statement as proposals; rejected ones are listed and contribute zero.

use rust_decimal::Decimal;

use crate::models::{AdvancePaymentInstallment, AuditStep, AuditWarning, DeductionLine, Deductions};

use super::money::round_money;

/// The result of reconciling deductions, including the audit step.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// The deduction components and installment lines.
    pub deductions: Deductions,
    /// `PENDING_INSTALLMENTS` when some installments await a decision.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Combines a salary's installments and flat deductions into its deduction total.
pub fn reconcile_deductions(
    installments: &[AdvancePaymentInstallment],
    other_deductions: Decimal,
    step_number: u32,
) -> DeductionResult {
    let total_advance: Decimal = installments
        .iter()
        .filter(|i| i.is_approved())
        .map(|i| i.amount_paid)
        .sum();
    let approved_count = installments.iter().filter(|i| i.is_approved()).count();
    let pending_count = installments.iter().filter(|i| i.is_pending()).count();

    let lines = installments
        .iter()
        .map(|i| DeductionLine {
            installment_id: i.id,
            advance_id: i.advance_id,
            amount: i.amount_paid,
            status: i.status,
            approved_at: i.approved_at,
        })
        .collect();

    let total_advance_deductions = round_money(total_advance);
    let other_deductions = round_money(other_deductions);
    let deductions = Deductions {
        total_advance_deductions,
        other_deductions,
        total_deductions: total_advance_deductions + other_deductions,
        approved_count,
        pending_count,
        lines,
    };

    let mut warnings = Vec::new();
    if pending_count > 0 {
        warnings.push(AuditWarning::new(
            "PENDING_INSTALLMENTS",
            format!(
                "{} installment(s) await approval and are not deducted",
                pending_count
            ),
            "medium",
        ));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "deductions".to_string(),
        rule_name: "Deduction Reconciliation".to_string(),
        input: serde_json::json!({
            "installments": installments.len(),
            "approved_installments": approved_count,
            "pending_installments": pending_count,
            "other_deductions": other_deductions.to_string()
        }),
        output: serde_json::json!({
            "total_advance_deductions": deductions.total_advance_deductions.to_string(),
            "total_deductions": deductions.total_deductions.to_string()
        }),
        reasoning: format!(
            "{} approved installment(s) = {}; + {} other = {}",
            approved_count,
            deductions.total_advance_deductions,
            deductions.other_deductions,
            deductions.total_deductions
        ),
    };

    DeductionResult {
        deductions,
        warnings,
        audit_step,
    }
}
