//! Referral bonuses.
//!
//! An eligible, unpaid referral is folded into the referrer's pending salary
//! for the period as an addition to `other_bonuses`, and the referral is
//! linked to that salary. Undoing reverses both.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeStatus, PayPeriod, Referral};
use crate::store::PayrollData;

use super::generation::generate_in;
use super::outcome::{GenerationFailure, ReferralRunSummary, UndoReferralsOutcome};
use super::{PayrollEngine, recompose};

/// A referral recorded at hire time.
#[derive(Debug, Clone)]
pub struct NewReferral {
    /// The employee who made the referral.
    pub referrer_id: String,
    /// The hire.
    pub referred_employee_id: String,
    /// Bonus paid to the referrer.
    pub bonus_amount: Decimal,
    /// First day the bonus may be paid.
    pub eligible_at: NaiveDate,
}

/// Returns true if the referral may be paid into `period` now.
fn is_payable(
    data: &PayrollData,
    referral: &Referral,
    period: PayPeriod,
    policy: &PayrollPolicy,
) -> bool {
    if !referral.is_payable_in(period) {
        return false;
    }
    if !policy.referral_requires_active_referred {
        return true;
    }
    data.employee(&referral.referred_employee_id)
        .is_ok_and(|e| e.status == EmployeeStatus::Active)
}

/// Folds the referrer's payable referrals into a pending salary.
///
/// Returns the number of referrals applied. The caller recomposes.
pub(super) fn apply_referrals(
    data: &mut PayrollData,
    salary_id: Uuid,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<usize> {
    let salary = data.salary(salary_id)?;
    salary.ensure_pending("apply referral bonuses")?;
    let (referrer_id, period) = (salary.employee_id.clone(), salary.period);

    let payable: Vec<Referral> = data
        .referrals_by(&referrer_id)
        .filter(|r| is_payable(data, r, period, policy))
        .cloned()
        .collect();
    let applied = payable.len();

    let mut total = Decimal::ZERO;
    for mut referral in payable {
        referral.mark_paid(salary_id, now);
        total += referral.bonus_amount;
        data.save_referral(referral);
    }
    if applied > 0 {
        data.salary_mut(salary_id)?.other_bonuses += total;
        info!(
            salary_id = %salary_id,
            referrer_id = %referrer_id,
            referrals = applied,
            bonus = %total,
            "Applied referral bonuses"
        );
    }
    Ok(applied)
}

impl PayrollEngine {
    /// Records a referral.
    pub fn create_referral(&self, referral: NewReferral) -> EngineResult<Referral> {
        if referral.bonus_amount <= Decimal::ZERO {
            return Err(EngineError::validation(
                "bonus_amount",
                "must be greater than zero",
            ));
        }
        if referral.referrer_id == referral.referred_employee_id {
            return Err(EngineError::validation(
                "referred_employee_id",
                "an employee cannot refer themselves",
            ));
        }

        let created = self.store.transaction(|data| {
            data.employee(&referral.referrer_id)?;
            data.employee(&referral.referred_employee_id)?;
            let created = Referral {
                id: Uuid::new_v4(),
                referrer_id: referral.referrer_id.clone(),
                referred_employee_id: referral.referred_employee_id.clone(),
                bonus_amount: referral.bonus_amount,
                eligible_at: referral.eligible_at,
                paid_at: None,
                salary_id: None,
                archived: false,
            };
            data.save_referral(created.clone());
            Ok(created)
        })?;

        info!(
            referral_id = %created.id,
            referrer_id = %created.referrer_id,
            referred_employee_id = %created.referred_employee_id,
            "Recorded referral"
        );
        Ok(created)
    }

    /// Pays every eligible referral bonus for `period`.
    ///
    /// A referrer without a salary for the period has one generated; a
    /// referrer whose salary is frozen is skipped and the bonus carries over.
    pub fn process_referrals(&self, period: PayPeriod) -> EngineResult<ReferralRunSummary> {
        let mut referrers: Vec<String> = self.store.read(|data| {
            data.referrals()
                .filter(|r| is_payable(data, r, period, &self.policy))
                .map(|r| r.referrer_id.clone())
                .collect()
        });
        referrers.sort();
        referrers.dedup();

        let mut summary = ReferralRunSummary {
            period,
            applied: 0,
            salary_ids: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        };

        for referrer_id in &referrers {
            let now = Utc::now();
            let result = self.store.transaction(|data| {
                let existing = data
                    .salary_for(referrer_id, period)
                    .map(|s| (s.id, s.status.is_frozen()));
                match existing {
                    Some((_, true)) => Ok(None),
                    Some((salary_id, false)) => {
                        let applied = apply_referrals(data, salary_id, &self.policy, now)?;
                        recompose(data, salary_id, &self.policy, now)?;
                        Ok(Some((salary_id, applied)))
                    }
                    None => {
                        let before = paid_count(data, referrer_id);
                        let generated = generate_in(data, referrer_id, period, &self.policy, now)?;
                        let applied = paid_count(data, referrer_id) - before;
                        Ok(Some((generated.salary_id, applied)))
                    }
                }
            });

            match result {
                Ok(Some((salary_id, applied))) => {
                    summary.applied += applied;
                    summary.salary_ids.push(salary_id);
                }
                Ok(None) => summary.skipped += 1,
                Err(err) => {
                    warn!(
                        referrer_id = %referrer_id,
                        period = %period,
                        error = %err,
                        "Referral processing failed"
                    );
                    summary.failures.push(GenerationFailure {
                        employee_id: referrer_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            period = %period,
            applied = summary.applied,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "Referral processing completed"
        );
        Ok(summary)
    }

    /// Reverses the referral bonuses carried by a pending salary.
    pub fn undo_referrals(&self, salary_id: Uuid) -> EngineResult<UndoReferralsOutcome> {
        let now = Utc::now();
        let outcome = self.store.transaction(|data| {
            let salary = data.salary(salary_id)?;
            salary.ensure_pending("undo referral bonuses")?;

            let carried: Vec<Referral> = data
                .referrals_by(&salary.employee_id)
                .filter(|r| r.salary_id == Some(salary_id))
                .cloned()
                .collect();
            let reverted = carried.len();
            let mut total = Decimal::ZERO;
            for mut referral in carried {
                total += referral.bonus_amount;
                referral.unmark_paid();
                data.save_referral(referral);
            }

            let salary = data.salary_mut(salary_id)?;
            salary.other_bonuses = (salary.other_bonuses - total).max(Decimal::ZERO);

            let statement = recompose(data, salary_id, &self.policy, now)?;
            Ok(UndoReferralsOutcome { reverted, statement })
        })?;

        info!(salary_id = %salary_id, reverted = outcome.reverted, "Reverted referral bonuses");
        Ok(outcome)
    }
}

fn paid_count(data: &PayrollData, referrer_id: &str) -> usize {
    data.referrals_by(referrer_id)
        .filter(|r| r.paid_at.is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::SalaryStatus;

    fn referral(referrer: &str, referred: &str, eligible: NaiveDate) -> NewReferral {
        NewReferral {
            referrer_id: referrer.to_string(),
            referred_employee_id: referred.to_string(),
            bonus_amount: dec("2000"),
            eligible_at: eligible,
        }
    }

    fn feb(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn generate(engine: &PayrollEngine, employee_id: &str) -> Uuid {
        engine
            .generate_salaries(february(), Some(employee_id))
            .unwrap()
            .salaries[0]
            .salary_id
    }

    #[test]
    fn test_create_referral_validates() {
        let engine = engine_with(&["emp_001", "emp_002"]);
        let mut bad = referral("emp_001", "emp_002", feb(1));
        bad.bonus_amount = Decimal::ZERO;
        assert!(matches!(engine.create_referral(bad), Err(EngineError::ValidationError { .. })));
        assert!(matches!(
            engine.create_referral(referral("emp_001", "emp_001", feb(1))),
            Err(EngineError::ValidationError { .. })
        ));
        assert!(matches!(
            engine.create_referral(referral("emp_001", "emp_404", feb(1))),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_generation_applies_eligible_referrals() {
        let engine = engine_with(&["emp_001", "emp_002"]);
        engine.create_referral(referral("emp_001", "emp_002", feb(20))).unwrap();
        engine
            .create_referral(referral(
                "emp_001",
                "emp_002",
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            ))
            .unwrap();

        let summary = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let salary = engine.salary(summary.salaries[0].salary_id).unwrap();
        assert_eq!(salary.other_bonuses, dec("2000"));
        assert_eq!(summary.salaries[0].net_salary, dec("2000"));

        // Regenerating does not pay the same referral twice.
        engine.generate_salaries(february(), Some("emp_001")).unwrap();
        assert_eq!(engine.salary(salary.id).unwrap().other_bonuses, dec("2000"));
    }

    #[test]
    fn test_referral_held_while_referred_not_active() {
        let engine = engine_with(&["emp_001"]);
        engine
            .register_employee(employee("emp_002", EmployeeStatus::Inactive))
            .unwrap();
        engine.create_referral(referral("emp_001", "emp_002", feb(1))).unwrap();

        let summary = engine.process_referrals(february()).unwrap();
        assert_eq!(summary.applied, 0);
        assert!(summary.salary_ids.is_empty());
    }

    #[test]
    fn test_process_referrals_generates_missing_salary() {
        let engine = engine_with(&["emp_001", "emp_002"]);
        engine.create_referral(referral("emp_001", "emp_002", feb(1))).unwrap();

        let summary = engine.process_referrals(february()).unwrap();
        assert_eq!(summary.applied, 1);
        let salary = engine.salary_for("emp_001", february()).unwrap();
        assert_eq!(summary.salary_ids, vec![salary.id]);
        assert_eq!(salary.other_bonuses, dec("2000"));
    }

    #[test]
    fn test_process_referrals_updates_pending_and_skips_frozen() {
        let engine = engine_with(&["emp_001", "emp_002", "emp_003"]);
        let pending = generate(&engine, "emp_001");
        let frozen = generate(&engine, "emp_003");
        engine.update_salary_status(frozen, SalaryStatus::Processing).unwrap();

        engine.create_referral(referral("emp_001", "emp_002", feb(1))).unwrap();
        engine.create_referral(referral("emp_003", "emp_002", feb(1))).unwrap();

        let summary = engine.process_referrals(february()).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(engine.salary(pending).unwrap().other_bonuses, dec("2000"));
        assert_eq!(engine.salary(frozen).unwrap().other_bonuses, Decimal::ZERO);
    }

    #[test]
    fn test_undo_referrals_reverses_bonus_and_allows_delete() {
        let engine = engine_with(&["emp_001", "emp_002"]);
        let created = engine.create_referral(referral("emp_001", "emp_002", feb(1))).unwrap();
        let salary_id = generate(&engine, "emp_001");

        assert!(matches!(engine.delete_salary(salary_id), Err(EngineError::Conflict { .. })));

        let outcome = engine.undo_referrals(salary_id).unwrap();
        assert_eq!(outcome.reverted, 1);
        assert_eq!(outcome.statement.earnings.other_bonuses, Decimal::ZERO);
        let stored = engine.store().read(|d| d.referrals().find(|r| r.id == created.id).unwrap().clone());
        assert!(stored.paid_at.is_none());
        assert!(stored.salary_id.is_none());

        engine.delete_salary(salary_id).unwrap();
    }

    #[test]
    fn test_undo_referrals_requires_pending() {
        let engine = engine_with(&["emp_001"]);
        let salary_id = generate(&engine, "emp_001");
        engine.update_salary_status(salary_id, SalaryStatus::Processing).unwrap();
        assert!(matches!(engine.undo_referrals(salary_id), Err(EngineError::Conflict { .. })));
    }
}
