//! Calculation logic for the payroll engine.
//!
//! This module contains the pure salary pipeline: attendance aggregation,
//! earned-leave tiers, earnings, deduction reconciliation, and net salary
//! composition, plus the installment decision rules. Nothing here touches
//! persistence; every step returns its value alongside an [`AuditStep`].
//!
//! [`AuditStep`]: crate::models::AuditStep

mod attendance_aggregation;
mod deductions;
mod earned_leave;
mod earnings;
mod installment;
mod money;
mod net_salary;
mod salary;

pub use attendance_aggregation::{AttendanceAggregationResult, aggregate_attendance};
pub use deductions::{DeductionResult, reconcile_deductions};
pub use earned_leave::{EarnedLeaveResult, calculate_earned_leaves};
pub use earnings::{EarningsResult, calculate_earnings};
pub use installment::{approve_installment, edit_installment, reject_installment};
pub use money::{round_money, round_whole};
pub use net_salary::{NetSalaryResult, compose_net_salary, write_snapshot};
pub use salary::{SalaryInput, calculate_salary, statement_from_snapshot};
