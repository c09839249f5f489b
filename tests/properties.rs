//! Property-based tests for the salary pipeline.
//!
//! These tests check the pipeline invariants with proptest:
//! regeneration is idempotent, a record lands in exactly one bucket,
//! leave tiers are a step function, and approved installments never
//! exceed the advance principal.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{
    aggregate_attendance, calculate_earned_leaves, calculate_salary, SalaryInput,
};
use payroll_engine::config::PayrollPolicy;
use payroll_engine::engine::{AttendanceSubmission, PayrollEngine};
use payroll_engine::models::{
    AttendanceRecord, AttendanceStatus, Employee, EmployeeStatus, PayPeriod,
};

fn february() -> PayPeriod {
    PayPeriod::new(2, 2026).unwrap()
}

fn following(period: PayPeriod) -> PayPeriod {
    if period.month() == 12 {
        PayPeriod::new(1, period.year() + 1).unwrap()
    } else {
        PayPeriod::new(period.month() + 1, period.year()).unwrap()
    }
}

fn record(day: u32, is_present: bool, is_half_day: bool, overtime: bool) -> AttendanceRecord {
    AttendanceSubmission {
        employee_id: "emp_001".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
        is_present,
        is_half_day,
        overtime,
        is_weekly_off: false,
        is_work_from_home: false,
        status: AttendanceStatus::Approved,
    }
    .into_record()
}

/// Strategy for one day's flags: present, half day, overtime.
fn day_flags() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

/// Strategy for a month of well-formed attendance, one entry per day.
fn month_flags() -> impl Strategy<Value = Vec<(bool, bool, bool)>> {
    prop::collection::vec(
        prop_oneof![
            Just((true, false, false)),
            Just((true, true, false)),
            Just((true, false, true)),
            Just((false, false, false)),
        ],
        0..=28,
    )
}

/// Strategy for a money amount between 0.01 and `max` with 2 decimal places.
fn money(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..=max * 100).prop_map(|cents| Decimal::new(cents, 2))
}

fn engine_with_employee(base_salary: Decimal) -> PayrollEngine {
    let engine = PayrollEngine::new(PayrollPolicy::default());
    engine
        .register_employee(Employee {
            id: "emp_001".to_string(),
            name: "Property".to_string(),
            base_salary: Some(base_salary),
            status: EmployeeStatus::Active,
        })
        .unwrap();
    engine
}

proptest! {
    /// Property: regenerating a pending salary with unchanged inputs yields the same row.
    #[test]
    fn prop_regeneration_is_idempotent(
        base in money(200_000),
        days in month_flags(),
    ) {
        let engine = engine_with_employee(base);
        let records: Vec<AttendanceRecord> = days
            .iter()
            .enumerate()
            .map(|(i, &(p, h, o))| record(i as u32 + 1, p, h, o))
            .collect();
        engine.import_attendance(records).unwrap();

        let first = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let before = engine.salary(first.salaries[0].salary_id).unwrap();
        let second = engine.generate_salaries(february(), Some("emp_001")).unwrap();
        let after = engine.salary(second.salaries[0].salary_id).unwrap();

        prop_assert_eq!(before.id, after.id);
        prop_assert_eq!(before.present_days, after.present_days);
        prop_assert_eq!(before.regular_days, after.regular_days);
        prop_assert_eq!(before.half_days, after.half_days);
        prop_assert_eq!(before.overtime_days, after.overtime_days);
        prop_assert_eq!(before.leaves_earned, after.leaves_earned);
        prop_assert_eq!(before.leave_salary, after.leave_salary);
        prop_assert_eq!(before.overtime_bonus, after.overtime_bonus);
        prop_assert_eq!(before.advance_deduction, after.advance_deduction);
        prop_assert_eq!(first.salaries[0].net_salary, second.salaries[0].net_salary);
    }

    /// Property: every approved record contributes to exactly one bucket.
    #[test]
    fn prop_record_lands_in_one_bucket(
        (is_present, is_half_day, overtime) in day_flags(),
    ) {
        let records = [record(2, is_present, is_half_day, overtime)];
        let result = aggregate_attendance(
            &records,
            "emp_001",
            february(),
            &PayrollPolicy::default(),
            1,
        );
        let s = result.summary;
        prop_assert_eq!(s.regular_days + s.half_days + s.overtime_days + s.leave_days, 1);
        prop_assert!(s.present_days <= Decimal::ONE);
        if is_present && is_half_day {
            prop_assert_eq!(s.half_days, 1);
            prop_assert_eq!(s.overtime_days, 0);
        }
    }

    /// Property: leaves earned is a step function of present days.
    #[test]
    fn prop_leave_tiers_are_step_function(tenths in 0i64..=310) {
        let present_days = Decimal::new(tenths, 1);
        let leaves =
            calculate_earned_leaves(present_days, &PayrollPolicy::default(), 1).leaves_earned;
        let expected = if present_days >= Decimal::from(25) {
            2
        } else if present_days >= Decimal::from(15) {
            1
        } else {
            0
        };
        prop_assert_eq!(leaves, expected);
    }

    /// Property: net salary equals earned minus deductions for any pending input.
    #[test]
    fn prop_net_is_earned_minus_deductions(
        base in money(200_000),
        bonus in money(10_000),
        deduction in money(10_000),
        days in month_flags(),
    ) {
        let records: Vec<AttendanceRecord> = days
            .iter()
            .enumerate()
            .map(|(i, &(p, h, o))| record(i as u32 + 1, p, h, o))
            .collect();
        let input = SalaryInput {
            salary_id: None,
            status: None,
            employee_id: "emp_001",
            period: february(),
            base_salary: base,
            other_bonuses: bonus,
            other_deductions: deduction,
            attendance: &records,
            installments: &[],
        };
        let statement = calculate_salary(&input, &PayrollPolicy::default());
        prop_assert_eq!(
            statement.net_salary,
            statement.earnings.base_salary_earned - statement.deductions.total_deductions
        );
    }

    /// Property: approved installments never exceed the principal, and
    /// rejecting an installment never moves the balance.
    #[test]
    fn prop_installments_never_overdraw_advance(
        principal in money(50_000),
        emi_share in 1u32..=100,
        decisions in prop::collection::vec((0u8..3, 1u32..=150), 1..8),
    ) {
        let engine = engine_with_employee(Decimal::from(30_000));
        let emi = (principal * Decimal::from(emi_share) / Decimal::from(100))
            .round_dp(2)
            .max(Decimal::new(1, 2));
        let advance = engine.create_advance("emp_001", principal, emi, None).unwrap();
        engine.approve_advance(advance.id, "hr_001").unwrap();

        let mut period = february();
        let mut approved_total = Decimal::ZERO;
        for (action, share) in decisions {
            let summary = engine.generate_salaries(period, Some("emp_001")).unwrap();
            let salary_id = summary.salaries[0].salary_id;
            let statement = engine.salary_statement(salary_id).unwrap();
            period = following(period);

            let Some(line) = statement.deductions.lines.first() else {
                // Settled: nothing left to suggest.
                break;
            };
            let before = engine.advance(advance.id).unwrap().remaining_amount;

            match action {
                0 => {
                    engine.reject_installment(line.installment_id, "hr_001").unwrap();
                    prop_assert_eq!(engine.advance(advance.id).unwrap().remaining_amount, before);
                }
                1 => {
                    let decision = engine
                        .approve_installment(line.installment_id, "hr_001")
                        .unwrap();
                    approved_total += decision.installment.amount_paid;
                }
                _ => {
                    let amount =
                        (principal * Decimal::from(share) / Decimal::from(100)).round_dp(2);
                    if engine.edit_installment(line.installment_id, amount).is_ok() {
                        prop_assert!(amount <= before);
                    }
                    let approval = engine.approve_installment(line.installment_id, "hr_001");
                    if let Ok(decision) = approval {
                        approved_total += decision.installment.amount_paid;
                    }
                }
            }

            let remaining = engine.advance(advance.id).unwrap().remaining_amount;
            prop_assert!(approved_total <= principal);
            prop_assert_eq!(remaining, principal - approved_total);
        }
    }
}
