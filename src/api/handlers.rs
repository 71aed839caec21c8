//! HTTP request handlers for the fee engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{EstimateOptions, estimate_catalog};
use crate::ingest::load_catalog;
use crate::models::CatalogRecord;

use super::request::{CsvEstimateQuery, EstimateRequest};
use super::response::{ApiError, ApiErrorResponse, EstimateResponse, RegimeInfo, RegimesResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/estimate", post(estimate_handler))
        .route("/estimate/csv", post(estimate_csv_handler))
        .route("/regimes", get(regimes_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /estimate endpoint.
///
/// Accepts catalog items as JSON and returns one enriched record per item.
async fn estimate_handler(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing estimate request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
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
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let (items, options) = request.into_parts();
    run_estimate(&state, correlation_id, &items, &options)
}

/// Handler for POST /estimate/csv endpoint.
///
/// Accepts an inventory export as a CSV body; periods and regimes come from
/// the query string.
async fn estimate_csv_handler(
    State(state): State<AppState>,
    Query(query): Query<CsvEstimateQuery>,
    body: String,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing CSV estimate request");

    let items = match load_catalog(body.as_bytes(), "request body") {
        Ok(items) => items,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Catalog could not be read"
            );
            return error_response(err.into());
        }
    };

    run_estimate(&state, correlation_id, &items, &query.into())
}

fn run_estimate(
    state: &AppState,
    correlation_id: Uuid,
    items: &[CatalogRecord],
    options: &EstimateOptions,
) -> Response {
    let start_time = Instant::now();
    match estimate_catalog(state.config().config(), items, options) {
        Ok(batch) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                records = batch.summary.total_records,
                failed = batch.summary.failed_records,
                unresolved_fees = batch.summary.unresolved_fees,
                duration_us = duration.as_micros(),
                "Estimate completed successfully"
            );
            json_response(StatusCode::OK, EstimateResponse::new(correlation_id, batch))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Estimate failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /regimes endpoint.
///
/// Lists the configured regimes with their categories and table sizes.
async fn regimes_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config().config();
    let metadata = config.metadata();
    let body = RegimesResponse {
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        default_periods: config.periods().to_vec(),
        regimes: config.regimes().iter().map(RegimeInfo::from).collect(),
    };
    json_response(StatusCode::OK, body)
}
