//! Request types for the fee engine API.
//!
//! This module defines the JSON request body for `POST /estimate` and the
//! query string accepted by `POST /estimate/csv`.

use serde::{Deserialize, Serialize};

use crate::calculation::EstimateOptions;
use crate::models::CatalogRecord;

/// Request body for the `/estimate` endpoint.
///
/// Items use the inventory export's column names (`fnsku`, `sales-price`,
/// `longest-side`, ...). Numbers may be given as JSON numbers or strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// The catalog records to estimate.
    pub items: Vec<CatalogRecord>,
    /// Fee periods; the configured defaults when absent.
    #[serde(default)]
    pub periods: Option<Vec<String>>,
    /// Regime ids; every configured regime when absent.
    #[serde(default)]
    pub regimes: Option<Vec<String>>,
    /// Attach lookup traces to every fee.
    #[serde(default)]
    pub include_trace: bool,
}

impl EstimateRequest {
    /// Splits the request into its catalog and its batch options.
    pub fn into_parts(self) -> (Vec<CatalogRecord>, EstimateOptions) {
        let options = EstimateOptions {
            periods: self.periods,
            regimes: self.regimes,
            include_trace: self.include_trace,
        };
        (self.items, options)
    }
}

/// Query parameters for the `/estimate/csv` endpoint.
///
/// `periods` and `regimes` are comma-separated lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvEstimateQuery {
    /// Comma-separated fee periods.
    #[serde(default)]
    pub periods: Option<String>,
    /// Comma-separated regime ids.
    #[serde(default)]
    pub regimes: Option<String>,
    /// Attach lookup traces to every fee.
    #[serde(default)]
    pub include_trace: bool,
}

fn split_list(list: Option<String>) -> Option<Vec<String>> {
    list.map(|text| {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

impl From<CsvEstimateQuery> for EstimateOptions {
    fn from(query: CsvEstimateQuery) -> Self {
        EstimateOptions {
            periods: split_list(query.periods),
            regimes: split_list(query.regimes),
            include_trace: query.include_trace,
        }
    }
}
