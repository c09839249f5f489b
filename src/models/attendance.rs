//! Attendance record model.
//!
//! One [`AttendanceRecord`] exists per employee per calendar day. Only
//! [`AttendanceStatus::Approved`] records count toward salary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// HR verification state of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Submitted, awaiting HR verification.
    PendingVerification,
    /// Verified; counts toward salary.
    Approved,
    /// Rejected by HR; may be resubmitted.
    Rejected,
}

/// The single salary bucket a record contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    /// Full present day without overtime.
    Regular,
    /// Present for half of the day.
    HalfDay,
    /// Full present day plus overtime.
    Overtime,
    /// Not present.
    Leave,
}

/// A single day of attendance for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// Whether the employee was present.
    pub is_present: bool,
    /// Whether only half the day was worked.
    #[serde(default)]
    pub is_half_day: bool,
    /// Whether overtime was worked. Mutually exclusive with `is_half_day`.
    #[serde(default)]
    pub overtime: bool,
    /// Whether the day was the employee's weekly off.
    #[serde(default)]
    pub is_weekly_off: bool,
    /// Whether the employee worked from home.
    #[serde(default)]
    pub is_work_from_home: bool,
    /// HR verification state.
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Returns true if the record counts toward salary.
    pub fn is_approved(&self) -> bool {
        self.status == AttendanceStatus::Approved
    }

    /// Returns true if both the half-day and overtime flags are set.
    pub fn is_malformed(&self) -> bool {
        self.is_half_day && self.overtime
    }

    /// Rejects records whose half-day and overtime flags are both set.
    pub fn validate(&self) -> EngineResult<()> {
        if self.is_malformed() {
            return Err(EngineError::validation(
                "overtime",
                "a half day cannot also be an overtime day",
            ));
        }
        Ok(())
    }

    /// Classifies the record into exactly one salary bucket.
    ///
    /// The half-day flag takes precedence, so a malformed record that sets
    /// both flags is counted as a half day and never as overtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{AttendanceRecord, AttendanceStatus, DayKind};
    /// use chrono::NaiveDate;
    /// use uuid::Uuid;
    ///
    /// let record = AttendanceRecord {
    ///     id: Uuid::new_v4(),
    ///     employee_id: "emp_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
    ///     is_present: true,
    ///     is_half_day: false,
    ///     overtime: true,
    ///     is_weekly_off: false,
    ///     is_work_from_home: false,
    ///     status: AttendanceStatus::Approved,
    /// };
    /// assert_eq!(record.day_kind(), DayKind::Overtime);
    /// ```
    pub fn day_kind(&self) -> DayKind {
        match (self.is_present, self.is_half_day, self.overtime) {
            (false, _, _) => DayKind::Leave,
            (true, true, _) => DayKind::HalfDay,
            (true, false, true) => DayKind::Overtime,
            (true, false, false) => DayKind::Regular,
        }
    }
}
