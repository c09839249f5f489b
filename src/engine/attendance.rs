//! Attendance submission and verification.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, AttendanceStatus, PayPeriod, SalaryStatus};
use crate::store::PayrollData;

use super::outcome::AttendanceConflict;
use super::{PayrollEngine, recompose_if_pending};

/// One day of attendance as submitted by an employee, manager, or HR.
#[derive(Debug, Clone)]
pub struct AttendanceSubmission {
    /// The employee.
    pub employee_id: String,
    /// The day.
    pub date: NaiveDate,
    /// Whether the employee was present.
    pub is_present: bool,
    /// Present for half the day.
    pub is_half_day: bool,
    /// Worked overtime.
    pub overtime: bool,
    /// The day is the employee's weekly off.
    pub is_weekly_off: bool,
    /// Worked from home.
    pub is_work_from_home: bool,
    /// Initial verification state.
    pub status: AttendanceStatus,
}

impl AttendanceSubmission {
    /// Builds a new record with a fresh id.
    pub fn into_record(self) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: self.employee_id,
            date: self.date,
            is_present: self.is_present,
            is_half_day: self.is_half_day,
            overtime: self.overtime,
            is_weekly_off: self.is_weekly_off,
            is_work_from_home: self.is_work_from_home,
            status: self.status,
        }
    }
}

/// Refuses changes to attendance in a month whose salary has been paid.
fn ensure_month_open(
    data: &PayrollData,
    employee_id: &str,
    date: NaiveDate,
) -> EngineResult<PayPeriod> {
    let period = PayPeriod::of_date(date)?;
    if let Some(salary) = data.salary_for(employee_id, period) {
        if salary.status == SalaryStatus::Paid {
            return Err(EngineError::conflict(format!(
                "salary {} for {} is paid; attendance is locked",
                salary.id, period
            )));
        }
    }
    Ok(period)
}

/// Recomposes the month's pending salary unless the employee still has
/// duplicate attendance in it.
fn recompose_if_resolved(
    data: &mut PayrollData,
    employee_id: &str,
    period: PayPeriod,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> EngineResult<Option<Uuid>> {
    let conflicts = data.attendance_conflicts(period, Some(employee_id)).len();
    if conflicts > 0 {
        warn!(
            employee_id = %employee_id,
            period = %period,
            conflicts,
            "Pending salary left unchanged until duplicate attendance is resolved"
        );
        return Ok(None);
    }
    recompose_if_pending(data, employee_id, period, policy, now)
}

impl PayrollEngine {
    /// Submits or replaces the attendance of one employee for one day.
    ///
    /// The record for the same employee and day is overwritten in place;
    /// rejected records on that day are left alone. If the month's salary is
    /// still pending and the employee has no duplicate attendance in the
    /// month, the salary is recomposed.
    pub fn submit_attendance(
        &self,
        submission: AttendanceSubmission,
    ) -> EngineResult<AttendanceRecord> {
        let now = Utc::now();
        let (record, recomposed) = self.store.transaction(|data| {
            data.employee(&submission.employee_id)?;
            let candidate = submission.clone().into_record();
            candidate.validate()?;
            let period = ensure_month_open(data, &candidate.employee_id, candidate.date)?;

            let existing: Vec<Uuid> = data
                .attendance_on(&candidate.employee_id, candidate.date)
                .into_iter()
                .filter(|r| r.status != AttendanceStatus::Rejected)
                .map(|r| r.id)
                .collect();
            let record = match existing.as_slice() {
                [] => candidate,
                [id] => AttendanceRecord { id: *id, ..candidate },
                _ => {
                    return Err(EngineError::conflict(format!(
                        "employee {} has {} records on {}; resolve the duplicates first",
                        candidate.employee_id,
                        existing.len(),
                        candidate.date
                    )));
                }
            };
            data.save_attendance(record.clone());

            let recomposed =
                recompose_if_resolved(data, &record.employee_id, period, &self.policy, now)?;
            Ok((record, recomposed))
        })?;

        info!(
            attendance_id = %record.id,
            employee_id = %record.employee_id,
            date = %record.date,
            status = ?record.status,
            recomposed_salary = ?recomposed,
            "Recorded attendance"
        );
        Ok(record)
    }

    /// Imports attendance records as they are, such as from a bulk upload.
    ///
    /// Duplicate days are stored and surface through
    /// [`PayrollEngine::attendance_conflicts`]. Affected pending salaries are
    /// recomposed.
    pub fn import_attendance(&self, records: Vec<AttendanceRecord>) -> EngineResult<usize> {
        let now = Utc::now();
        let count = records.len();
        self.store.transaction(|data| {
            let mut touched: Vec<(String, PayPeriod)> = Vec::new();
            for record in records {
                data.employee(&record.employee_id)?;
                let period = ensure_month_open(data, &record.employee_id, record.date)?;
                if record.is_malformed() {
                    warn!(
                        attendance_id = %record.id,
                        employee_id = %record.employee_id,
                        date = %record.date,
                        "Imported attendance marked both half day and overtime"
                    );
                }
                let key = (record.employee_id.clone(), period);
                if !touched.contains(&key) {
                    touched.push(key);
                }
                data.save_attendance(record);
            }
            for (employee_id, period) in touched {
                recompose_if_resolved(data, &employee_id, period, &self.policy, now)?;
            }
            Ok(())
        })?;

        info!(records = count, "Imported attendance");
        Ok(count)
    }

    /// Sets the verification state of an attendance record.
    ///
    /// Rejecting one of a day's duplicate records resolves the conflict. If
    /// the month's salary is still pending and no duplicates remain, it is
    /// recomposed.
    pub fn set_attendance_status(
        &self,
        attendance_id: Uuid,
        status: AttendanceStatus,
    ) -> EngineResult<AttendanceRecord> {
        let now = Utc::now();
        let record = self.store.transaction(|data| {
            let mut record = data.attendance_record(attendance_id)?.clone();
            let period = ensure_month_open(data, &record.employee_id, record.date)?;
            record.status = status;
            data.save_attendance(record.clone());
            recompose_if_resolved(data, &record.employee_id, period, &self.policy, now)?;
            Ok(record)
        })?;

        info!(attendance_id = %attendance_id, status = ?status, "Updated attendance status");
        Ok(record)
    }

    /// Lists days with more than one attendance record for the same employee.
    pub fn attendance_conflicts(&self, period: PayPeriod) -> Vec<AttendanceConflict> {
        self.store.read(|data| {
            data.attendance_conflicts(period, None)
                .into_iter()
                .map(|group| AttendanceConflict {
                    employee_id: group[0].employee_id.clone(),
                    date: group[0].date,
                    record_ids: group.iter().map(|r| r.id).collect(),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_submission_rejects_half_day_with_overtime() {
        let engine = engine_with(&["emp_001"]);
        let mut submission = day("emp_001", 2);
        submission.is_half_day = true;
        submission.overtime = true;

        let result = engine.submit_attendance(submission);
        assert!(matches!(
            result,
            Err(EngineError::ValidationError { ref field, .. }) if field == "overtime"
        ));
    }

    #[test]
    fn test_submission_for_unknown_employee_is_not_found() {
        let engine = engine_with(&[]);
        let result = engine.submit_attendance(day("emp_404", 2));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_resubmission_replaces_same_day() {
        let engine = engine_with(&["emp_001"]);
        let first = engine.submit_attendance(day("emp_001", 2)).unwrap();
        let mut second = day("emp_001", 2);
        second.is_half_day = true;
        let replaced = engine.submit_attendance(second).unwrap();

        assert_eq!(first.id, replaced.id);
        assert!(replaced.is_half_day);
        assert!(engine.attendance_conflicts(february()).is_empty());
    }

    #[test]
    fn test_approved_attendance_recomposes_pending_salary() {
        let engine = engine_with(&["emp_001"]);
        let summary = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let salary_id = summary.salaries[0].salary_id;

        let mut submission = day("emp_001", 2);
        submission.status = AttendanceStatus::PendingVerification;
        let record = engine.submit_attendance(submission).unwrap();
        assert_eq!(engine.salary(salary_id).unwrap().present_days, Decimal::ZERO);

        engine
            .set_attendance_status(record.id, AttendanceStatus::Approved)
            .unwrap();
        assert_eq!(engine.salary(salary_id).unwrap().present_days, dec("1"));

        engine
            .set_attendance_status(record.id, AttendanceStatus::Rejected)
            .unwrap();
        assert_eq!(engine.salary(salary_id).unwrap().present_days, Decimal::ZERO);
    }

    #[test]
    fn test_attendance_edit_after_processing_does_not_change_snapshot() {
        let engine = engine_with(&["emp_001"]);
        submit_february(&engine, "emp_001");
        let summary = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let salary_id = summary.salaries[0].salary_id;
        engine
            .update_salary_status(salary_id, SalaryStatus::Processing)
            .unwrap();

        let mut leave = day("emp_001", 3);
        leave.is_present = false;
        engine.submit_attendance(leave).unwrap();

        let salary = engine.salary(salary_id).unwrap();
        assert_eq!(salary.present_days, dec("26"));
        let statement = engine.salary_statement(salary_id).unwrap();
        assert_eq!(statement.net_salary, dec("30535.71"));
    }

    #[test]
    fn test_attendance_locked_once_paid() {
        let engine = engine_with(&["emp_001"]);
        let record = engine.submit_attendance(day("emp_001", 2)).unwrap();
        let summary = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let salary_id = summary.salaries[0].salary_id;
        engine.update_salary_status(salary_id, SalaryStatus::Processing).unwrap();
        engine.update_salary_status(salary_id, SalaryStatus::Paid).unwrap();

        assert!(matches!(
            engine.submit_attendance(day("emp_001", 3)),
            Err(EngineError::Conflict { .. })
        ));
        assert!(matches!(
            engine.set_attendance_status(record.id, AttendanceStatus::Rejected),
            Err(EngineError::Conflict { .. })
        ));
    }

    #[test]
    fn test_duplicate_day_is_not_double_counted_in_pending_salary() {
        let engine = engine_with(&["emp_001"]);
        let summary = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let salary_id = summary.salaries[0].salary_id;

        let first = day("emp_001", 5).into_record();
        let second = day("emp_001", 5).into_record();
        engine
            .import_attendance(vec![first.clone(), second.clone()])
            .unwrap();
        engine.submit_attendance(day("emp_001", 6)).unwrap();

        assert_eq!(engine.salary(salary_id).unwrap().present_days, Decimal::ZERO);
        let statement = engine.salary_statement(salary_id).unwrap();
        assert_eq!(statement.attendance.present_days, dec("2"));
        assert!(statement
            .audit_trace
            .warnings
            .iter()
            .any(|w| w.code == "DUPLICATE_ATTENDANCE"));

        engine
            .set_attendance_status(second.id, AttendanceStatus::Rejected)
            .unwrap();
        assert!(engine.attendance_conflicts(february()).is_empty());
        assert_eq!(engine.salary(salary_id).unwrap().present_days, dec("2"));
        assert_eq!(engine.salary_statement(salary_id).unwrap().net_salary, dec("2142.86"));
    }

    #[test]
    fn test_resubmission_leaves_rejected_record_alone() {
        let engine = engine_with(&["emp_001"]);
        let first = engine.submit_attendance(day("emp_001", 2)).unwrap();
        engine
            .set_attendance_status(first.id, AttendanceStatus::Rejected)
            .unwrap();

        let resubmitted = engine.submit_attendance(day("emp_001", 2)).unwrap();
        assert_ne!(resubmitted.id, first.id);
        assert!(engine.attendance_conflicts(february()).is_empty());
    }

    #[test]
    fn test_import_surfaces_conflicts() {
        let engine = engine_with(&["emp_001"]);
        let a = day("emp_001", 4).into_record();
        let b = day("emp_001", 4).into_record();
        engine.import_attendance(vec![a.clone(), b.clone()]).unwrap();

        let conflicts = engine.attendance_conflicts(february());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].record_ids.len(), 2);
        assert!(conflicts[0].record_ids.contains(&a.id));

        assert!(matches!(
            engine.submit_attendance(day("emp_001", 4)),
            Err(EngineError::Conflict { .. })
        ));
    }
}
