//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every handler validates its body through the request type's `to_*`
//! conversion; validation failures become `400` with `success: false`.
//! Extractor rejections (malformed JSON, missing or mistyped fields) are
//! mapped to the same `400` body.

use super::{
    AppState,
    types::{
        CalendarQuery, CalendarResponse, ClassReportRequest, ClassReportResponse, EvaluateRequest,
        EvaluateResponse, GradeRequest, GradeResponse, HealthResponse, PolicyResponse,
        PromotionRequest, PromotionResponse, ScaleResponse,
    },
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use mis_core::grade_for_score;

/// Status and message for a body the JSON extractor could not turn into a
/// request. Oversized bodies keep `413`; everything else is a `400`.
fn rejected_body(rejection: &JsonRejection) -> (StatusCode, String) {
    tracing::debug!(status = %rejection.status(), "Rejected request body");
    let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, format!("Invalid request body: {}", rejection.body_text()))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SCALE / POLICY HANDLERS
// =============================================================================

/// Publish the grading scale.
pub async fn scale_handler() -> impl IntoResponse {
    Json(ScaleResponse::default())
}

/// Publish the active promotion thresholds.
pub async fn policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(PolicyResponse::from(&state.policy))
}

// =============================================================================
// GRADE HANDLER
// =============================================================================

/// Grade a single score.
pub async fn grade_handler(
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            let (status, message) = rejected_body(&rejection);
            return (status, Json(GradeResponse::error(message)));
        }
    };

    match request.to_score() {
        Ok(score) => {
            let result = grade_for_score(score);
            (
                StatusCode::OK,
                Json(GradeResponse::success(score, result.grade, result.remark)),
            )
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(GradeResponse::error(format!("Invalid score: {}", e))),
        ),
    }
}

// =============================================================================
// PROMOTION HANDLER
// =============================================================================

/// Classify an average and failed-subject count.
pub async fn promotion_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromotionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            let (status, message) = rejected_body(&rejection);
            return (status, Json(PromotionResponse::error(message)));
        }
    };

    match request.to_input() {
        Ok(input) => {
            let status = state.policy.classify_input(&input);
            (StatusCode::OK, Json(PromotionResponse::success(status)))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(PromotionResponse::error(format!("Invalid input: {}", e))),
        ),
    }
}

// =============================================================================
// EVALUATE HANDLER
// =============================================================================

/// Grade a student's term assessment.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            let (status, message) = rejected_body(&rejection);
            return (status, Json(EvaluateResponse::error(message)));
        }
    };

    let result = request
        .to_assessment()
        .and_then(|assessment| assessment.evaluate(&state.policy));

    match result {
        Ok(report) => {
            tracing::debug!(
                student = %report.student_id,
                subjects = report.subject_count(),
                status = %report.status,
                "Evaluated term assessment"
            );
            (StatusCode::OK, Json(EvaluateResponse::success(report)))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(EvaluateResponse::error(format!("Evaluation failed: {}", e))),
        ),
    }
}

// =============================================================================
// CLASS REPORT HANDLER
// =============================================================================

/// Summarize a class for one term.
pub async fn class_report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClassReportRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            let (status, message) = rejected_body(&rejection);
            return (status, Json(ClassReportResponse::error(message)));
        }
    };

    match request.summarize(&state.policy) {
        Ok(summary) => {
            tracing::debug!(
                class = %summary.class_name,
                students = summary.student_count,
                "Summarized class"
            );
            (StatusCode::OK, Json(ClassReportResponse::success(summary)))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ClassReportResponse::error(format!(
                "Class report failed: {}",
                e
            ))),
        ),
    }
}

// =============================================================================
// CALENDAR HANDLER
// =============================================================================

/// Academic year and term for `?date=` (today when absent).
pub async fn calendar_handler(
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CalendarResponse::error(format!(
                    "Invalid query: {}",
                    rejection.body_text()
                ))),
            );
        }
    };
    let today = chrono::Local::now().date_naive();
    match query.to_date(today) {
        Ok(date) => (StatusCode::OK, Json(CalendarResponse::success(date))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(CalendarResponse::error(e.to_string())),
        ),
    }
}
