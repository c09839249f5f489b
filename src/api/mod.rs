//! HTTP API for the payroll engine.
//!
//! A thin `axum` layer over [`crate::engine::PayrollEngine`]: request bodies
//! are validated here, and engine errors become JSON error responses.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AdjustmentRequest, AttendanceRequest, AttendanceStatusRequest, BulkSalaryStatusRequest,
    CreateAdvanceRequest, DecisionRequest, EditInstallmentRequest, GenerateSalariesRequest,
    PeriodRequest, ReferralRequest, RegisterEmployeeRequest, SalaryStatusRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
