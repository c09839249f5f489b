//! Attendance aggregation.
//!
//! Reduces one employee's approved attendance for a month into the day-count
//! buckets the earnings step consumes. Each calendar day is counted at most
//! once.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::{
    AttendanceRecord, AttendanceSummary, AuditStep, AuditWarning, DayKind, PayPeriod,
};

/// The result of aggregating a month of attendance.
#[derive(Debug, Clone)]
pub struct AttendanceAggregationResult {
    /// The day-count buckets.
    pub summary: AttendanceSummary,
    /// Warnings about records that were counted unusually or not at all.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Buckets the approved attendance of `employee_id` within `period`.
///
/// Records for other employees, other months, or not yet approved are ignored.
/// Each counted record lands in exactly one of the regular, half-day,
/// overtime, or leave buckets; a record flagged both half day and overtime is
/// counted as a half day and reported with a `MALFORMED_ATTENDANCE` warning.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_attendance;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus, PayPeriod};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let record = AttendanceRecord {
///     id: Uuid::new_v4(),
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
///     is_present: true,
///     is_half_day: true,
///     overtime: false,
///     is_weekly_off: false,
///     is_work_from_home: false,
///     status: AttendanceStatus::Approved,
/// };
///
/// let period = PayPeriod::new(2, 2026).unwrap();
/// let result = aggregate_attendance(&[record], "emp_001", period, &PayrollPolicy::default(), 1);
/// assert_eq!(result.summary.half_days, 1);
/// assert_eq!(result.summary.present_days, Decimal::new(5, 1));
/// ```
pub fn aggregate_attendance(
    records: &[AttendanceRecord],
    employee_id: &str,
    period: PayPeriod,
    policy: &PayrollPolicy,
    step_number: u32,
) -> AttendanceAggregationResult {
    let mut summary = AttendanceSummary::empty(period.days_in_month());
    let mut warnings = Vec::new();
    let mut counted = 0usize;
    let mut ignored = 0usize;
    let mut counted_days: HashSet<NaiveDate> = HashSet::new();

    for record in records
        .iter()
        .filter(|r| r.employee_id == employee_id && period.contains_date(r.date))
    {
        if !record.is_approved() {
            ignored += 1;
            continue;
        }
        if !counted_days.insert(record.date) {
            ignored += 1;
            warnings.push(AuditWarning::new(
                "DUPLICATE_ATTENDANCE",
                format!(
                    "More than one approved record on {}; only the first is counted",
                    record.date
                ),
                "high",
            ));
            continue;
        }
        counted += 1;

        if record.is_malformed() {
            warnings.push(AuditWarning::new(
                "MALFORMED_ATTENDANCE",
                format!(
                    "Attendance on {} is marked both half day and overtime; counted as a half day",
                    record.date
                ),
                "medium",
            ));
        }

        match record.day_kind() {
            DayKind::Regular => summary.regular_days += 1,
            DayKind::HalfDay => summary.half_days += 1,
            DayKind::Overtime => summary.overtime_days += 1,
            DayKind::Leave => summary.leave_days += 1,
        }
        if record.is_weekly_off {
            summary.weekly_off_days += 1;
        }
        if record.is_work_from_home {
            summary.work_from_home_days += 1;
        }
    }

    summary.present_days = Decimal::from(summary.regular_days)
        + Decimal::from(summary.overtime_days)
        + Decimal::from(summary.half_days) * policy.half_day_weight;

    if counted == 0 {
        warnings.push(AuditWarning::new(
            "NO_ATTENDANCE",
            format!(
                "No approved attendance for employee '{}' in {}",
                employee_id, period
            ),
            "low",
        ));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_aggregation".to_string(),
        rule_name: "Attendance Aggregation".to_string(),
        input: serde_json::json!({
            "employee_id": employee_id,
            "period": period.to_string(),
            "approved_records": counted,
            "ignored_records": ignored,
            "half_day_weight": policy.half_day_weight.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_days_in_month": summary.total_days_in_month,
            "regular_days": summary.regular_days,
            "half_days": summary.half_days,
            "overtime_days": summary.overtime_days,
            "leave_days": summary.leave_days,
            "present_days": summary.present_days.normalize().to_string()
        }),
        reasoning: format!(
            "{} regular + {} overtime + {} half x {} = {} present days of {}",
            summary.regular_days,
            summary.overtime_days,
            summary.half_days,
            policy.half_day_weight.normalize(),
            summary.present_days.normalize(),
            summary.total_days_in_month
        ),
    };

    AttendanceAggregationResult {
        summary,
        warnings,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(day: u32, present: bool, half: bool, overtime: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            is_present: present,
            is_half_day: half,
            overtime,
            is_weekly_off: false,
            is_work_from_home: false,
            status: AttendanceStatus::Approved,
        }
    }

    fn february() -> PayPeriod {
        PayPeriod::new(2, 2026).unwrap()
    }

    fn aggregate(records: &[AttendanceRecord]) -> AttendanceAggregationResult {
        aggregate_attendance(records, "emp_001", february(), &PayrollPolicy::default(), 1)
    }

    #[test]
    fn test_buckets_each_kind_of_day() {
        let records = vec![
            record(2, true, false, false),
            record(3, true, true, false),
            record(4, true, false, true),
            record(5, false, false, false),
        ];
        let result = aggregate(&records);

        assert_eq!(result.summary.regular_days, 1);
        assert_eq!(result.summary.half_days, 1);
        assert_eq!(result.summary.overtime_days, 1);
        assert_eq!(result.summary.leave_days, 1);
        assert_eq!(result.summary.present_days, dec("2.5"));
        assert_eq!(result.summary.total_days_in_month, 28);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_february_example_present_days() {
        let mut records: Vec<AttendanceRecord> =
            (1..=24).map(|d| record(d, true, false, false)).collect();
        records.push(record(25, true, true, false));
        records.push(record(26, true, true, false));
        records.push(record(27, true, false, true));

        let result = aggregate(&records);
        assert_eq!(result.summary.regular_days, 24);
        assert_eq!(result.summary.present_days, dec("26"));
    }

    #[test]
    fn test_only_approved_records_in_period_count() {
        let mut pending = record(2, true, false, false);
        pending.status = AttendanceStatus::PendingVerification;
        let mut rejected = record(3, true, false, false);
        rejected.status = AttendanceStatus::Rejected;
        let mut other_month = record(4, true, false, false);
        other_month.date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let mut other_employee = record(5, true, false, false);
        other_employee.employee_id = "emp_002".to_string();

        let records = vec![
            pending,
            rejected,
            other_month,
            other_employee,
            record(6, true, false, false),
        ];
        let result = aggregate(&records);

        assert_eq!(result.summary.regular_days, 1);
        assert_eq!(result.summary.present_days, dec("1"));
        assert_eq!(result.audit_step.input["ignored_records"], 2);
    }

    #[test]
    fn test_malformed_record_counts_once_as_half_day() {
        let records = vec![record(2, true, true, true)];
        let result = aggregate(&records);

        assert_eq!(result.summary.half_days, 1);
        assert_eq!(result.summary.overtime_days, 0);
        assert_eq!(result.summary.present_days, dec("0.5"));
        assert_eq!(result.warnings[0].code, "MALFORMED_ATTENDANCE");
    }

    #[test]
    fn test_duplicate_day_is_counted_once() {
        let mut rejected = record(5, true, false, false);
        rejected.status = AttendanceStatus::Rejected;
        let records = vec![
            record(5, true, false, false),
            record(5, true, false, false),
            rejected,
            record(6, true, false, false),
        ];
        let result = aggregate(&records);

        assert_eq!(result.summary.regular_days, 2);
        assert_eq!(result.summary.present_days, dec("2"));
        assert_eq!(result.audit_step.input["ignored_records"], 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "DUPLICATE_ATTENDANCE");
    }

    #[test]
    fn test_no_attendance_yields_zero_buckets_and_warning() {
        let result = aggregate(&[]);

        assert_eq!(result.summary, AttendanceSummary::empty(28));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "NO_ATTENDANCE");
    }

    #[test]
    fn test_informational_flags_are_counted() {
        let mut wfh = record(2, true, false, false);
        wfh.is_work_from_home = true;
        let mut off = record(8, false, false, false);
        off.is_weekly_off = true;

        let result = aggregate(&[wfh, off]);
        assert_eq!(result.summary.work_from_home_days, 1);
        assert_eq!(result.summary.weekly_off_days, 1);
        assert_eq!(result.summary.leave_days, 1);
    }

    #[test]
    fn test_audit_step_records_buckets() {
        let result = aggregate_attendance(
            &[record(2, true, false, false)],
            "emp_001",
            february(),
            &PayrollPolicy::default(),
            3,
        );
        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "attendance_aggregation");
        assert_eq!(result.audit_step.output["regular_days"], 1);
        assert_eq!(result.audit_step.output["present_days"], "1");
    }
}
