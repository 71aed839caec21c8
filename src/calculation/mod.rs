//! Calculation logic for the fee engine.
//!
//! This module contains the rate engine: unit conversion, dimensional
//! weight, size classification, shipping weight resolution, weight range
//! matching, fee expression evaluation, table-driven fee lookup with weight
//! fallback, removal and multi-channel fees, and the batch orchestrator that
//! applies them to a catalog.

mod batch;
mod channel_fee;
mod fee_expression;
mod fee_lookup;
mod pricing;
mod removal_fee;
mod shipping_weight;
mod size_category;
mod units;
mod volumetric;
mod weight_range;

pub use batch::{
    EstimateOptions, EstimatePlan, WEIGHT_DECIMAL_PLACES, estimate_catalog, estimate_record,
    estimate_regime, summarize,
};
pub use channel_fee::resolve_channel_fee;
pub use fee_expression::{
    CURRENCY_SYMBOLS, FEE_DECIMAL_PLACES, FeeExpression, FeeExpressionError, evaluate_fee,
};
pub use fee_lookup::{
    ACTUAL_WEIGHT, FulfillmentKey, SHIPPING_WEIGHT, VOLUMETRIC_WEIGHT, WeightCandidates,
    resolve_from_rows, resolve_fulfillment_fee,
};
pub use pricing::resolve_bucket;
pub use removal_fee::{calculate_removal_fee, removal_fee_for};
pub use shipping_weight::resolve_shipping_weight;
pub use size_category::{classification_weight, classify, determine_size_category};
pub use units::{CM_PER_INCH, GRAMS_PER_KILOGRAM, GRAMS_PER_POUND, convert};
pub use volumetric::volumetric_weight;
pub use weight_range::{Bound, RangeParseError, WeightRange, match_weight};
