//! Response types for the fee engine API.
//!
//! This module defines the success envelopes and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Regime;
use crate::error::EngineError;
use crate::models::{BatchEstimate, BatchSummary, EstimateRecord, Unit};

/// The engine version reported in every estimate.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Response body for the estimate endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    /// Correlation id of the request.
    pub request_id: Uuid,
    /// When the estimate was produced.
    pub generated_at: DateTime<Utc>,
    /// Version of the engine that produced it.
    pub engine_version: String,
    /// One record per input item, in input order.
    pub records: Vec<EstimateRecord>,
    /// Aggregate statistics.
    pub summary: BatchSummary,
}

impl EstimateResponse {
    /// Wraps a batch result in the response envelope.
    pub fn new(request_id: Uuid, batch: BatchEstimate) -> Self {
        Self {
            request_id,
            generated_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            records: batch.records,
            summary: batch.summary,
        }
    }
}

/// Summary of one configured regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeInfo {
    /// The regime id.
    pub id: String,
    /// Free-form description.
    pub description: String,
    /// Unit of length thresholds.
    pub length_unit: Unit,
    /// Unit of weight thresholds.
    pub weight_unit: Unit,
    /// Every category the regime can produce.
    pub categories: Vec<String>,
    /// Number of fulfillment rate rows loaded.
    pub fulfillment_rows: usize,
    /// Number of multi-channel rate rows loaded.
    pub channel_rows: usize,
    /// Whether the regime charges removal fees.
    pub removal_fees: bool,
}

impl From<&Regime> for RegimeInfo {
    fn from(regime: &Regime) -> Self {
        let rules = &regime.rules;
        Self {
            id: rules.id.clone(),
            description: rules.description.clone(),
            length_unit: rules.length_unit,
            weight_unit: rules.weight_unit,
            categories: rules.categories().into_iter().map(str::to_string).collect(),
            fulfillment_rows: regime.fulfillment_table.len(),
            channel_rows: regime.channel_table.len(),
            removal_fees: rules.removal.is_some(),
        }
    }
}

/// Response body for `GET /regimes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimesResponse {
    /// The configuration name.
    pub name: String,
    /// The configuration version.
    pub version: String,
    /// Periods estimated by default.
    pub default_periods: Vec<String>,
    /// Configured regimes, in output order.
    pub regimes: Vec<RegimeInfo>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a regime not found error response.
    pub fn regime_not_found(id: &str) -> Self {
        Self::with_details(
            "REGIME_NOT_FOUND",
            format!("Regime not found: {}", id),
            format!("The regime '{}' is not configured in this engine", id),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidRegime { id, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    format!("Invalid regime '{}'", id),
                    message,
                ),
            },
            EngineError::RateTableError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Rate table error",
                    format!("Failed to read {}: {}", path, message),
                ),
            },
            EngineError::RegimeNotFound { id } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::regime_not_found(&id),
            },
            EngineError::CatalogError {
                source_name,
                message,
            } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_CATALOG",
                    format!("Catalog '{}' could not be read", source_name),
                    message,
                ),
            },
            EngineError::InvalidRecord {
                item_id,
                field,
                message,
            } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_RECORD",
                    format!("Invalid record '{}' field '{}'", item_id, field),
                    message,
                ),
            },
            EngineError::UnknownMarketplace {
                marketplace,
                regime,
            } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "UNKNOWN_MARKETPLACE",
                    format!("Unknown marketplace '{}'", marketplace),
                    format!("The regime '{}' has no bucket for this marketplace", regime),
                ),
            },
        }
    }
}
