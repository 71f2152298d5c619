//! HTTP request handlers for the workshop engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::layout_month;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriodKey, ScheduledItem, parse_date};
use crate::payroll::{next_pay_period, previous_pay_period, resolve_pay_period};

use super::request::{ConfirmRequest, LayoutRequest, PayrollRequest, PeriodQuery, PeriodSelector};
use super::response::{ApiError, ApiErrorResponse, CalculationResponse, PeriodResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calendar/layout", post(layout_handler))
        .route("/payroll/period", get(period_handler))
        .route("/payroll/calculate", post(calculate_handler))
        .route("/payroll/confirm", post(confirm_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(err: EngineError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a body rejection to a 400 with the serde message.
fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
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
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /calendar/layout.
///
/// Lays the submitted missions out over the six-week grid of the month.
async fn layout_handler(
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing layout request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let (year, month) = (request.year, request.month);
    let items: EngineResult<Vec<ScheduledItem>> =
        request.items.into_iter().map(ScheduledItem::try_from).collect();

    let start_time = Instant::now();
    match items.and_then(|items| layout_month(year, month, &items)) {
        Ok(layout) => {
            info!(
                correlation_id = %correlation_id,
                year,
                month,
                segments = layout.segments().count(),
                max_lanes = layout.max_lanes(),
                duration_us = start_time.elapsed().as_micros(),
                "Layout completed successfully"
            );
            json_response(StatusCode::OK, layout)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Layout failed");
            error_response(err)
        }
    }
}

/// Handler for GET /payroll/period?today=YYYY-MM-DD.
async fn period_handler(query: Result<Query<PeriodQuery>, QueryRejection>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => {
            let body_text = rejection.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "Query rejected");
            return json_response(StatusCode::BAD_REQUEST, ApiError::validation_error(body_text));
        }
    };

    let resolved = parse_date(&query.today)
        .and_then(resolve_pay_period)
        .and_then(|period| {
            Ok(PeriodResponse {
                previous: previous_pay_period(&period)?,
                next: next_pay_period(&period)?,
                period,
            })
        });

    match resolved {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                today = %query.today,
                period = %body.period,
                "Resolved pay period"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Period resolution failed");
            error_response(err)
        }
    }
}

/// Handler for POST /payroll/calculate.
///
/// Aggregates the submitted events into the worker's pay period and stores
/// it as calculated. A paid period answers 409.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_calculation(&state, request) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %result.period.user_id,
                period = %result.period.range,
                events_count = result.period.events.len(),
                final_amount = %result.summary.totals.final_amount,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payroll calculation failed"
            );
            error_response(err)
        }
    }
}

fn perform_calculation(state: &AppState, request: PayrollRequest) -> EngineResult<CalculationResponse> {
    let selector = request.period()?;
    let events = request.typed_events()?;
    let service = state.payroll();

    let calculation = match selector {
        PeriodSelector::Today(today) => service.calculate_current(
            &request.user_id,
            request.base_salary,
            &events,
            request.attendance,
            today,
        )?,
        PeriodSelector::Explicit(range) => service.calculate_for(
            &request.user_id,
            range,
            request.base_salary,
            &events,
            request.attendance,
        )?,
    };

    Ok(CalculationResponse {
        period: calculation.period,
        summary: calculation.summary,
        currency: state.config().metadata().currency.clone(),
    })
}

/// Handler for POST /payroll/confirm.
///
/// Marks a calculated period as paid. Fails with 409 if it is already paid
/// or was never calculated, and 404 if it does not exist.
async fn confirm_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment confirmation");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let confirmed = PayPeriodKey::try_from(request)
        .and_then(|key| state.payroll().confirm_paid(&key, Utc::now()));

    match confirmed {
        Ok(period) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %period.user_id,
                period = %period.range,
                "Pay period confirmed as paid"
            );
            json_response(StatusCode::OK, period)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Confirmation failed");
            error_response(err)
        }
    }
}
