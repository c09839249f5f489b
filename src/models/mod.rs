//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod advance;
mod attendance;
mod employee;
mod pay_period;
mod referral;
mod salary;
mod salary_statement;

pub use advance::{Advance, AdvancePaymentInstallment, AdvanceStatus, InstallmentStatus};
pub use attendance::{AttendanceRecord, AttendanceStatus, DayKind};
pub use employee::{Employee, EmployeeStatus};
pub use pay_period::{MAX_PAY_YEAR, MIN_PAY_YEAR, PayPeriod};
pub use referral::{Referral, ReferralStage};
pub use salary::{Salary, SalaryStatus};
pub use salary_statement::{
    AttendanceSummary, AuditStep, AuditTrace, AuditWarning, DeductionLine, Deductions, Earnings,
    SalaryStatement, StatementSource,
};
