//! Monthly pay period model.
//!
//! Salaries are computed per calendar month. [`PayPeriod`] is passed explicitly
//! to every operation that needs a month; there is no ambient "current month".

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Earliest year accepted for a pay period.
pub const MIN_PAY_YEAR: i32 = 1900;
/// Latest year accepted for a pay period.
pub const MAX_PAY_YEAR: i32 = 9999;

/// A calendar month for which one salary per employee is computed.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(2, 2024).unwrap();
/// assert_eq!(period.days_in_month(), 29);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PayPeriodParts")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct PayPeriodParts {
    month: u32,
    year: i32,
}

impl TryFrom<PayPeriodParts> for PayPeriod {
    type Error = EngineError;

    fn try_from(parts: PayPeriodParts) -> Result<Self, Self::Error> {
        PayPeriod::new(parts.month, parts.year)
    }
}

impl PayPeriod {
    /// Creates a pay period, rejecting months outside 1-12 and implausible years.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::validation(
                "month",
                format!("{} is not between 1 and 12", month),
            ));
        }
        if !(MIN_PAY_YEAR..=MAX_PAY_YEAR).contains(&year) {
            return Err(EngineError::validation(
                "year",
                format!("{} is not between {} and {}", year, MIN_PAY_YEAR, MAX_PAY_YEAR),
            ));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date.
    pub fn of_date(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date.month(), date.year())
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Number of calendar days in this month (28-31).
    pub fn days_in_month(&self) -> u32 {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|first| {
                let next = first.checked_add_months(Months::new(1))?;
                u32::try_from(next.signed_duration_since(first).num_days()).ok()
            })
            .unwrap_or(31)
    }

    /// Checks if a date falls within this calendar month.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Checks if a date is on or before the last day of this month.
    pub fn has_reached(&self, date: NaiveDate) -> bool {
        (date.year(), date.month()) <= (self.year, self.month)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month_varies_by_month() {
        assert_eq!(PayPeriod::new(1, 2026).unwrap().days_in_month(), 31);
        assert_eq!(PayPeriod::new(2, 2026).unwrap().days_in_month(), 28);
        assert_eq!(PayPeriod::new(4, 2026).unwrap().days_in_month(), 30);
        assert_eq!(PayPeriod::new(12, 2026).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_leap_years() {
        assert_eq!(PayPeriod::new(2, 2024).unwrap().days_in_month(), 29);
        assert_eq!(PayPeriod::new(2, 2000).unwrap().days_in_month(), 29);
        assert_eq!(PayPeriod::new(2, 1900).unwrap().days_in_month(), 28);
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert!(matches!(
            PayPeriod::new(0, 2026),
            Err(EngineError::ValidationError { ref field, .. }) if field == "month"
        ));
        assert!(PayPeriod::new(13, 2026).is_err());
    }

    #[test]
    fn test_invalid_year_is_rejected() {
        assert!(matches!(
            PayPeriod::new(1, 1800),
            Err(EngineError::ValidationError { ref field, .. }) if field == "year"
        ));
    }

    #[test]
    fn test_contains_date_first_and_last_day() {
        let period = PayPeriod::new(2, 2026).unwrap();
        assert!(period.contains_date(date(2026, 2, 1)));
        assert!(period.contains_date(date(2026, 2, 28)));
        assert!(!period.contains_date(date(2026, 1, 31)));
        assert!(!period.contains_date(date(2026, 3, 1)));
        assert!(!period.contains_date(date(2025, 2, 10)));
    }

    #[test]
    fn test_has_reached() {
        let period = PayPeriod::new(6, 2026).unwrap();
        assert!(period.has_reached(date(2026, 6, 30)));
        assert!(period.has_reached(date(2025, 12, 1)));
        assert!(!period.has_reached(date(2026, 7, 1)));
    }

    #[test]
    fn test_last_allowed_december_has_31_days() {
        assert_eq!(PayPeriod::new(12, MAX_PAY_YEAR).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(PayPeriod::new(3, 2026).unwrap().to_string(), "03/2026");
    }

    #[test]
    fn test_deserialize_validates_month() {
        let ok: PayPeriod = serde_json::from_str(r#"{"month": 2, "year": 2026}"#).unwrap();
        assert_eq!(ok.month(), 2);

        let bad = serde_json::from_str::<PayPeriod>(r#"{"month": 14, "year": 2026}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_pay_period() {
        let period = PayPeriod::new(2, 2026).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert!(json.contains("\"month\":2"));
        assert!(json.contains("\"year\":2026"));
    }
}
