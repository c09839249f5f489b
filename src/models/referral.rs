//! Referral bonus model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;

/// Where a referral sits in its bonus lifecycle for a given period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStage {
    /// The eligibility date has not been reached.
    Pending,
    /// Eligible and not yet paid.
    Eligible,
    /// Folded into a salary.
    Paid,
}

/// Links a referring employee to a referred hire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    /// Unique identifier for the referral.
    pub id: Uuid,
    /// The employee who receives the bonus.
    pub referrer_id: String,
    /// The hire who was referred.
    pub referred_employee_id: String,
    /// Bonus fixed at creation.
    pub bonus_amount: Decimal,
    /// First day the bonus may be paid.
    pub eligible_at: NaiveDate,
    /// When the bonus was folded into a salary.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// The salary carrying the bonus.
    #[serde(default)]
    pub salary_id: Option<Uuid>,
    /// Archived referrals are never paid.
    #[serde(default)]
    pub archived: bool,
}

impl Referral {
    /// Returns the referral's stage as seen from the given pay period.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{PayPeriod, Referral, ReferralStage};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let referral = Referral {
    ///     id: Uuid::new_v4(),
    ///     referrer_id: "emp_001".to_string(),
    ///     referred_employee_id: "emp_050".to_string(),
    ///     bonus_amount: Decimal::new(2000, 0),
    ///     eligible_at: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
    ///     paid_at: None,
    ///     salary_id: None,
    ///     archived: false,
    /// };
    /// assert_eq!(referral.stage(PayPeriod::new(2, 2026).unwrap()), ReferralStage::Pending);
    /// assert_eq!(referral.stage(PayPeriod::new(3, 2026).unwrap()), ReferralStage::Eligible);
    /// ```
    pub fn stage(&self, period: PayPeriod) -> ReferralStage {
        if self.paid_at.is_some() {
            ReferralStage::Paid
        } else if period.has_reached(self.eligible_at) {
            ReferralStage::Eligible
        } else {
            ReferralStage::Pending
        }
    }

    /// Returns true if the bonus can be paid in the given period.
    pub fn is_payable_in(&self, period: PayPeriod) -> bool {
        !self.archived && self.stage(period) == ReferralStage::Eligible
    }

    /// Marks the bonus as carried by a salary.
    pub fn mark_paid(&mut self, salary_id: Uuid, at: DateTime<Utc>) {
        self.paid_at = Some(at);
        self.salary_id = Some(salary_id);
    }

    /// Unlinks the bonus so it carries over to a later salary.
    pub fn unmark_paid(&mut self) {
        self.paid_at = None;
        self.salary_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn referral(eligible_at: NaiveDate) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            referrer_id: "emp_001".to_string(),
            referred_employee_id: "emp_050".to_string(),
            bonus_amount: Decimal::new(2000, 0),
            eligible_at,
            paid_at: None,
            salary_id: None,
            archived: false,
        }
    }

    #[test]
    fn test_eligible_on_last_day_of_period() {
        let r = referral(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert!(r.is_payable_in(PayPeriod::new(2, 2026).unwrap()));
    }

    #[test]
    fn test_not_payable_before_eligibility_month() {
        let r = referral(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(!r.is_payable_in(PayPeriod::new(2, 2026).unwrap()));
    }

    #[test]
    fn test_archived_referral_is_never_payable() {
        let mut r = referral(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        r.archived = true;
        assert!(!r.is_payable_in(PayPeriod::new(2, 2026).unwrap()));
    }

    #[test]
    fn test_mark_and_unmark_paid() {
        let mut r = referral(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let period = PayPeriod::new(2, 2026).unwrap();
        let salary_id = Uuid::new_v4();

        r.mark_paid(salary_id, Utc::now());
        assert_eq!(r.stage(period), ReferralStage::Paid);
        assert_eq!(r.salary_id, Some(salary_id));
        assert!(!r.is_payable_in(period));

        r.unmark_paid();
        assert_eq!(r.stage(period), ReferralStage::Eligible);
        assert_eq!(r.salary_id, None);
    }
}
