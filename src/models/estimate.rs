//! Estimate result models.
//!
//! These types capture everything the engine derives for a catalog record:
//! the per-regime classification, every requested fee, and an optional
//! lookup trace explaining how each fee was (or was not) resolved.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeliverySpeed;

/// The classification of one item under one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The size category label.
    pub size_category: String,
    /// The weight that governs billing.
    pub shipping_weight: Decimal,
    /// The dimensional weight, in the regime's weight unit.
    pub volumetric_weight: Decimal,
    /// The actual weight, in the regime's weight unit.
    pub actual_weight: Decimal,
}

/// What happened when one candidate weight was tried against the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// A row's range accepted the weight and its fee evaluated.
    Matched {
        /// Index of the row within the filtered rows.
        row: usize,
        /// The accepting weight range text.
        weight_range: String,
        /// The fee specifier of the row.
        fee_spec: String,
        /// The evaluated fee.
        fee: Decimal,
    },
    /// A row's range accepted the weight but its fee could not be evaluated.
    FeeUnresolved {
        /// Index of the row within the filtered rows.
        row: usize,
        /// The fee specifier of the row.
        fee_spec: String,
        /// Why evaluation failed.
        reason: String,
    },
    /// No row's range accepted the weight.
    NoRangeMatched {
        /// How many rows carried a range that could not be parsed.
        unparseable_ranges: usize,
    },
}

/// One candidate weight and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightAttempt {
    /// Which candidate this was ("shipping", "actual", "volumetric").
    pub source: String,
    /// The weight tried.
    pub weight: Decimal,
    /// The outcome.
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// The audit trail of a single fee lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTrace {
    /// How many rows survived the categorical key filter.
    pub rows_considered: usize,
    /// Every candidate weight that was tried, in order.
    pub attempts: Vec<WeightAttempt>,
}

/// The result of resolving one fee from a rate table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLookup {
    /// The fee, or `None` if no applicable rate was found.
    pub fee: Option<Decimal>,
    /// How the fee was resolved.
    pub trace: LookupTrace,
}

impl FeeLookup {
    /// Returns true if a fee was found.
    pub fn is_resolved(&self) -> bool {
        self.fee.is_some()
    }
}

/// The fulfillment fee for one requested period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFee {
    /// The rate table period, e.g. "2024Q1".
    pub period: String,
    /// The fee, or `None` if unresolved.
    pub fee: Option<Decimal>,
    /// The lookup trace, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<LookupTrace>,
}

/// The multi-channel delivery fee for one delivery speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFee {
    /// The delivery speed.
    pub speed: DeliverySpeed,
    /// The fee, or `None` if unresolved.
    pub fee: Option<Decimal>,
    /// The lookup trace, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<LookupTrace>,
}

/// Everything computed for one record under one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeEstimate {
    /// The regime id.
    pub regime: String,
    /// The size category.
    pub size_category: String,
    /// The billing weight, rounded to 3 decimals for display.
    pub shipping_weight: Decimal,
    /// The dimensional weight, rounded to 3 decimals for display.
    pub volumetric_weight: Decimal,
    /// The pricing or country bucket used for fulfillment lookups.
    pub bucket: Option<String>,
    /// One fulfillment fee per requested period.
    pub fulfillment_fees: Vec<PeriodFee>,
    /// The removal fee, if the regime defines a removal schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_fee: Option<Decimal>,
    /// Multi-channel delivery fees, if the regime has a channel table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_fees: Vec<ChannelFee>,
    /// Why fee computation was skipped, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// The enriched output for one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRecord {
    /// The record identifier.
    pub item_id: String,
    /// Per-regime results; empty when the record itself was invalid.
    pub regimes: Vec<RegimeEstimate>,
    /// Why the record could not be processed, if it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EstimateRecord {
    /// Returns the estimate for a regime id, if present.
    pub fn regime(&self, id: &str) -> Option<&RegimeEstimate> {
        self.regimes.iter().find(|r| r.regime == id)
    }
}

/// Aggregate statistics for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of input records.
    pub total_records: usize,
    /// Records that failed validation.
    pub failed_records: usize,
    /// Fulfillment fees that could not be resolved.
    pub unresolved_fees: usize,
    /// Regime id → size category → record count.
    pub category_counts: BTreeMap<String, BTreeMap<String, usize>>,
    /// Regime id → period → mean of the resolved fulfillment fees.
    pub mean_fees: BTreeMap<String, BTreeMap<String, Decimal>>,
}

/// The complete, deterministic output of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEstimate {
    /// One record per input record, in input order.
    pub records: Vec<EstimateRecord>,
    /// Aggregate statistics.
    pub summary: BatchSummary,
}
