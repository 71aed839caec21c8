//! HTTP API module for the fee engine.
//!
//! This module provides the REST API endpoints for estimating fulfillment
//! fees of catalog items and listing the configured regimes:
//!
//! - `POST /estimate` takes JSON catalog items
//! - `POST /estimate/csv` takes an inventory export as a CSV body
//! - `GET /regimes` lists regimes, their categories and table sizes

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CsvEstimateQuery, EstimateRequest};
pub use response::{ApiError, ENGINE_VERSION, EstimateResponse, RegimeInfo, RegimesResponse};
pub use state::AppState;
