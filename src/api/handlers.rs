//! HTTP request handlers for the payroll API.
//!
//! Every handler tags its work with a correlation id, rejects malformed
//! input with a JSON error body, and maps [`EngineError`] through
//! [`ApiErrorResponse`].

use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;

use super::request::{
    AdjustmentRequest, AttendanceRequest, AttendanceStatusRequest, BulkSalaryStatusRequest,
    CreateAdvanceRequest, DecisionRequest, EditInstallmentRequest, GenerateSalariesRequest,
    PeriodRequest, ReferralRequest, RegisterEmployeeRequest, SalaryStatusRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/employees", post(register_employee_handler))
        .route("/employees/:id/mark-inactive", post(mark_inactive_handler))
        .route("/attendance", post(submit_attendance_handler))
        .route("/attendance/conflicts", get(attendance_conflicts_handler))
        .route("/attendance/:id/status", patch(attendance_status_handler))
        .route("/advances", post(create_advance_handler))
        .route("/advances/:id/approve", post(approve_advance_handler))
        .route("/advances/:id/reject", post(reject_advance_handler))
        .route("/salaries/generate", post(generate_salaries_handler))
        .route("/salaries/status", patch(bulk_salary_status_handler))
        .route("/salaries/:id", delete(delete_salary_handler))
        .route("/salaries/:id/stats", get(salary_stats_handler))
        .route("/salaries/:id/recompute", post(recompute_salary_handler))
        .route("/salaries/:id/adjustments", post(adjust_salary_handler))
        .route("/salaries/:id/status", patch(salary_status_handler))
        .route("/salaries/:id/undo-referrals", post(undo_referrals_handler))
        .route("/installments/:id", put(edit_installment_handler))
        .route("/installments/:id/approve", post(approve_installment_handler))
        .route("/installments/:id/reject", post(reject_installment_handler))
        .route("/referrals", post(create_referral_handler))
        .route("/referrals/process", post(process_referrals_handler))
        .with_state(state)
}

// =============================================================================
// Extraction and response helpers
// =============================================================================

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

/// Unwraps a JSON body, turning serde failures into 400 responses.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn parse_id(
    correlation_id: Uuid,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Uuid, ApiErrorResponse> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path parameter");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

fn parse_query<T>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(q)| q).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

/// Logs a refused operation and converts the error for the response.
fn refused(
    correlation_id: Uuid,
    operation: &'static str,
) -> impl Fn(EngineError) -> ApiErrorResponse {
    move |err| {
        warn!(
            correlation_id = %correlation_id,
            operation = operation,
            error = %err,
            "Request refused"
        );
        err.into()
    }
}

// =============================================================================
// Employees
// =============================================================================

/// Handler for POST /employees.
async fn register_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterEmployeeRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employee registration");

    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "register_employee");
    request.validate().map_err(&on_error)?;
    let employee = state
        .engine()
        .register_employee(request.into())
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::CREATED, &employee))
}

/// Handler for POST /employees/:id/mark-inactive.
async fn mark_inactive_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Marking employee inactive"
    );

    let employee = state
        .engine()
        .mark_employee_inactive(&employee_id)
        .map_err(refused(correlation_id, "mark_employee_inactive"))?;
    Ok(json_response(StatusCode::OK, &employee))
}

// =============================================================================
// Attendance
// =============================================================================

/// Handler for POST /attendance.
async fn submit_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance submission");

    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "submit_attendance");
    request.validate().map_err(&on_error)?;
    let record = state
        .engine()
        .submit_attendance(request.into())
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for PATCH /attendance/:id/status.
async fn attendance_status_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AttendanceStatusRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let attendance_id = parse_id(correlation_id, path)?;
    info!(
        correlation_id = %correlation_id,
        attendance_id = %attendance_id,
        "Processing attendance verification"
    );

    let request = parse_body(correlation_id, payload)?;
    let record = state
        .engine()
        .set_attendance_status(attendance_id, request.status)
        .map_err(refused(correlation_id, "set_attendance_status"))?;
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for GET /attendance/conflicts?month=&year=.
async fn attendance_conflicts_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodRequest>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_query(correlation_id, query)?;
    let period = request
        .period()
        .map_err(refused(correlation_id, "attendance_conflicts"))?;

    let conflicts = state.engine().attendance_conflicts(period);
    info!(
        correlation_id = %correlation_id,
        period = %period,
        conflicts = conflicts.len(),
        "Listed attendance conflicts"
    );
    Ok(json_response(StatusCode::OK, &conflicts))
}

// =============================================================================
// Advances and installments
// =============================================================================

/// Handler for POST /advances.
async fn create_advance_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateAdvanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing advance request");

    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "create_advance");
    request.validate().map_err(&on_error)?;
    let advance = state
        .engine()
        .create_advance(
            &request.employee_id,
            request.amount,
            request.emi_amount,
            request.reason,
        )
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::CREATED, &advance))
}

/// Handler for POST /advances/:id/approve.
async fn approve_advance_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let advance_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "approve_advance");
    request.validate().map_err(&on_error)?;

    let advance = state
        .engine()
        .approve_advance(advance_id, &request.decided_by)
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &advance))
}

/// Handler for POST /advances/:id/reject.
async fn reject_advance_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let advance_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "reject_advance");
    request.validate().map_err(&on_error)?;

    let advance = state
        .engine()
        .reject_advance(advance_id, &request.decided_by)
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &advance))
}

/// Handler for POST /installments/:id/approve.
async fn approve_installment_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let installment_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "approve_installment");
    request.validate().map_err(&on_error)?;

    let decision = state
        .engine()
        .approve_installment(installment_id, &request.decided_by)
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &decision))
}

/// Handler for POST /installments/:id/reject.
async fn reject_installment_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let installment_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "reject_installment");
    request.validate().map_err(&on_error)?;

    let decision = state
        .engine()
        .reject_installment(installment_id, &request.decided_by)
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &decision))
}

/// Handler for PUT /installments/:id.
async fn edit_installment_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EditInstallmentRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let installment_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;

    let decision = state
        .engine()
        .edit_installment(installment_id, request.amount_paid)
        .map_err(refused(correlation_id, "edit_installment"))?;
    Ok(json_response(StatusCode::OK, &decision))
}

// =============================================================================
// Salaries
// =============================================================================

/// Handler for POST /salaries/generate.
async fn generate_salaries_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSalariesRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary generation request");

    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "generate_salaries");
    let period = request.period().map_err(&on_error)?;

    let start_time = Instant::now();
    let summary = state
        .engine()
        .generate_salaries(period, request.employee_id.as_deref())
        .map_err(&on_error)?;
    info!(
        correlation_id = %correlation_id,
        period = %period,
        processed = summary.processed,
        skipped = summary.skipped,
        duration_us = start_time.elapsed().as_micros(),
        "Salary generation request completed"
    );
    Ok(json_response(StatusCode::OK, &summary))
}

/// Handler for GET /salaries/:id/stats.
async fn salary_stats_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;

    let start_time = Instant::now();
    let statement = state
        .engine()
        .salary_statement(salary_id)
        .map_err(refused(correlation_id, "salary_statement"))?;
    info!(
        correlation_id = %correlation_id,
        salary_id = %salary_id,
        net_salary = %statement.net_salary,
        duration_us = start_time.elapsed().as_micros(),
        "Salary statement produced"
    );
    Ok(json_response(StatusCode::OK, &statement))
}

/// Handler for POST /salaries/:id/recompute.
async fn recompute_salary_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;

    let statement = state
        .engine()
        .recompute_salary(salary_id)
        .map_err(refused(correlation_id, "recompute_salary"))?;
    Ok(json_response(StatusCode::OK, &statement))
}

/// Handler for POST /salaries/:id/adjustments.
async fn adjust_salary_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AdjustmentRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;

    let statement = state
        .engine()
        .adjust_salary(salary_id, request.bonus_amount, request.deduction_amount)
        .map_err(refused(correlation_id, "adjust_salary"))?;
    Ok(json_response(StatusCode::OK, &statement))
}

/// Handler for PATCH /salaries/:id/status.
async fn salary_status_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SalaryStatusRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;
    let request = parse_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        salary_id = %salary_id,
        status = request.status.as_str(),
        "Processing salary status change"
    );

    let outcome = state
        .engine()
        .update_salary_status(salary_id, request.status)
        .map_err(refused(correlation_id, "update_salary_status"))?;
    Ok(json_response(StatusCode::OK, &outcome))
}

/// Handler for PATCH /salaries/status.
async fn bulk_salary_status_handler(
    State(state): State<AppState>,
    payload: Result<Json<BulkSalaryStatusRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(correlation_id, payload)?;
    request
        .validate()
        .map_err(refused(correlation_id, "update_salary_statuses"))?;

    let outcome = state
        .engine()
        .update_salary_statuses(&request.salary_ids, request.status);
    info!(
        correlation_id = %correlation_id,
        updated = outcome.updated,
        failed = outcome.failed,
        "Bulk salary status change completed"
    );
    Ok(json_response(StatusCode::OK, &outcome))
}

/// Handler for POST /salaries/:id/undo-referrals.
async fn undo_referrals_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;

    let outcome = state
        .engine()
        .undo_referrals(salary_id)
        .map_err(refused(correlation_id, "undo_referrals"))?;
    Ok(json_response(StatusCode::OK, &outcome))
}

/// Handler for DELETE /salaries/:id.
async fn delete_salary_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let salary_id = parse_id(correlation_id, path)?;

    let salary = state
        .engine()
        .delete_salary(salary_id)
        .map_err(refused(correlation_id, "delete_salary"))?;
    Ok(json_response(StatusCode::OK, &salary))
}

// =============================================================================
// Referrals
// =============================================================================

/// Handler for POST /referrals.
async fn create_referral_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReferralRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "create_referral");
    request.validate().map_err(&on_error)?;

    let referral = state
        .engine()
        .create_referral(request.into())
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::CREATED, &referral))
}

/// Handler for POST /referrals/process.
async fn process_referrals_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing referral run");

    let request = parse_body(correlation_id, payload)?;
    let on_error = refused(correlation_id, "process_referrals");
    let period = request.period().map_err(&on_error)?;

    let summary = state
        .engine()
        .process_referrals(period)
        .map_err(&on_error)?;
    Ok(json_response(StatusCode::OK, &summary))
}
