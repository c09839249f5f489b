//! Installment decision rules.
//!
//! An installment moves `pending -> approved | rejected` and its amount may be
//! edited while pending. Every action requires the owning salary to be
//! pending. Callers hold the advance and salary as read inside the same
//! transaction that writes the result.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{Advance, AdvancePaymentInstallment, InstallmentStatus, Salary};

fn ensure_actionable(
    installment: &AdvancePaymentInstallment,
    salary: &Salary,
    action: &str,
) -> EngineResult<()> {
    if installment.salary_id != salary.id {
        return Err(EngineError::conflict(format!(
            "installment {} does not belong to salary {}",
            installment.id, salary.id
        )));
    }
    salary.ensure_pending(action)?;
    if !installment.is_pending() {
        return Err(EngineError::conflict(format!(
            "cannot {}: installment {} has already been decided",
            action, installment.id
        )));
    }
    Ok(())
}

fn ensure_linked(installment: &AdvancePaymentInstallment, advance: &Advance) -> EngineResult<()> {
    if installment.advance_id != advance.id {
        return Err(EngineError::conflict(format!(
            "installment {} does not belong to advance {}",
            installment.id, advance.id
        )));
    }
    Ok(())
}

/// Approves a pending installment and draws it down from the advance.
///
/// Fails with `ValidationError` if the amount exceeds the advance's
/// remaining balance; nothing is modified in that case.
pub fn approve_installment(
    installment: &mut AdvancePaymentInstallment,
    advance: &mut Advance,
    salary: &Salary,
    approved_by: &str,
    at: DateTime<Utc>,
) -> EngineResult<()> {
    ensure_actionable(installment, salary, "approve installment")?;
    ensure_linked(installment, advance)?;
    advance.apply_installment(installment.amount_paid)?;

    installment.status = InstallmentStatus::Approved;
    installment.approved_by = Some(approved_by.to_string());
    installment.approved_at = Some(at);
    Ok(())
}

/// Rejects a pending installment. The advance balance is left untouched.
pub fn reject_installment(
    installment: &mut AdvancePaymentInstallment,
    salary: &Salary,
    rejected_by: &str,
    at: DateTime<Utc>,
) -> EngineResult<()> {
    ensure_actionable(installment, salary, "reject installment")?;

    installment.status = InstallmentStatus::Rejected;
    installment.approved_by = Some(rejected_by.to_string());
    installment.approved_at = Some(at);
    Ok(())
}

/// Overwrites the amount of a pending installment.
///
/// The new amount must satisfy `0 < amount <= advance.remaining_amount`.
pub fn edit_installment(
    installment: &mut AdvancePaymentInstallment,
    advance: &Advance,
    salary: &Salary,
    amount_paid: Decimal,
) -> EngineResult<()> {
    ensure_actionable(installment, salary, "edit installment")?;
    ensure_linked(installment, advance)?;

    if amount_paid <= Decimal::ZERO {
        return Err(EngineError::validation(
            "amount_paid",
            "must be greater than zero",
        ));
    }
    if amount_paid > advance.remaining_amount {
        return Err(EngineError::validation(
            "amount_paid",
            format!(
                "{} exceeds remaining advance balance {}",
                amount_paid, advance.remaining_amount
            ),
        ));
    }

    installment.amount_paid = amount_paid;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdvanceStatus, PayPeriod, SalaryStatus};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Fixture {
        advance: Advance,
        salary: Salary,
        installment: AdvancePaymentInstallment,
    }

    fn fixture(amount: &str, emi: &str) -> Fixture {
        let mut advance = Advance::new("emp_001", dec(amount), dec(emi), None).unwrap();
        advance.approve("hr_001", Utc::now()).unwrap();
        let period = PayPeriod::new(2, 2026).unwrap();
        let salary = Salary::new_pending("emp_001", period, dec("30000"), Utc::now());
        let installment =
            AdvancePaymentInstallment::pending(&advance, salary.id, advance.emi_amount);
        Fixture {
            advance,
            salary,
            installment,
        }
    }

    fn approve(f: &mut Fixture) -> EngineResult<()> {
        approve_installment(
            &mut f.installment,
            &mut f.advance,
            &f.salary,
            "hr_001",
            Utc::now(),
        )
    }

    #[test]
    fn test_approve_decrements_remaining() {
        let mut f = fixture("5000", "1000");
        approve(&mut f).unwrap();

        assert_eq!(f.installment.status, InstallmentStatus::Approved);
        assert_eq!(f.installment.approved_by.as_deref(), Some("hr_001"));
        assert_eq!(f.advance.remaining_amount, dec("4000"));
    }

    #[test]
    fn test_approve_final_installment_settles_advance() {
        let mut f = fixture("1000", "1000");
        approve(&mut f).unwrap();
        assert!(f.advance.is_settled);
        assert_eq!(f.advance.status, AdvanceStatus::Settled);
    }

    #[test]
    fn test_approve_beyond_remaining_fails() {
        let mut f = fixture("5000", "1000");
        f.advance.remaining_amount = dec("500");
        let result = approve(&mut f);

        assert!(matches!(result, Err(EngineError::ValidationError { .. })));
        assert!(f.installment.is_pending());
        assert_eq!(f.advance.remaining_amount, dec("500"));
    }

    #[test]
    fn test_reject_leaves_advance_untouched() {
        let mut f = fixture("5000", "1000");
        reject_installment(&mut f.installment, &f.salary, "hr_001", Utc::now()).unwrap();
        assert_eq!(f.installment.status, InstallmentStatus::Rejected);
        assert_eq!(f.advance.remaining_amount, dec("5000"));
    }

    #[test]
    fn test_decided_installment_is_terminal() {
        let mut f = fixture("5000", "1000");
        reject_installment(&mut f.installment, &f.salary, "hr_001", Utc::now()).unwrap();

        let approve = approve(&mut f);
        assert!(matches!(approve, Err(EngineError::Conflict { .. })));
        let edit = edit_installment(&mut f.installment, &f.advance, &f.salary, dec("100"));
        assert!(matches!(edit, Err(EngineError::Conflict { .. })));
    }

    #[test]
    fn test_actions_require_pending_salary() {
        let mut f = fixture("5000", "1000");
        f.salary.status = SalaryStatus::Processing;

        let approve = approve(&mut f);
        assert!(matches!(approve, Err(EngineError::Conflict { .. })));
        let reject = reject_installment(&mut f.installment, &f.salary, "hr_001", Utc::now());
        assert!(matches!(reject, Err(EngineError::Conflict { .. })));
        let edit = edit_installment(&mut f.installment, &f.advance, &f.salary, dec("100"));
        assert!(matches!(edit, Err(EngineError::Conflict { .. })));
        assert_eq!(f.advance.remaining_amount, dec("5000"));
    }

    #[test]
    fn test_edit_bound_is_remaining_amount() {
        let mut f = fixture("5000", "1000");

        let over = edit_installment(&mut f.installment, &f.advance, &f.salary, dec("5001"));
        assert!(matches!(
            over,
            Err(EngineError::ValidationError { ref field, .. }) if field == "amount_paid"
        ));
        assert_eq!(f.installment.amount_paid, dec("1000"));

        edit_installment(&mut f.installment, &f.advance, &f.salary, dec("5000")).unwrap();
        assert_eq!(f.installment.amount_paid, dec("5000"));
    }

    #[test]
    fn test_edit_rejects_non_positive_amount() {
        let mut f = fixture("5000", "1000");
        let result = edit_installment(&mut f.installment, &f.advance, &f.salary, Decimal::ZERO);
        assert!(matches!(result, Err(EngineError::ValidationError { .. })));
    }

    #[test]
    fn test_installment_from_other_salary_is_conflict() {
        let mut f = fixture("5000", "1000");
        let march = PayPeriod::new(3, 2026).unwrap();
        let other = Salary::new_pending("emp_001", march, dec("30000"), Utc::now());
        let result = reject_installment(&mut f.installment, &other, "hr_001", Utc::now());
        assert!(matches!(result, Err(EngineError::Conflict { .. })));
    }
}
