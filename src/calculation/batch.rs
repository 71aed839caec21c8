//! Batch estimation.
//!
//! Applies the whole pipeline to each catalog record: validation, unit
//! conversion, classification under every selected regime, bucket
//! selection, and fee lookups. A record that fails validation is reported
//! with its reason and the batch carries on.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, Regime};
use crate::error::EngineResult;
use crate::models::{
    BatchEstimate, BatchSummary, CatalogRecord, ChannelFee, DeliverySpeed, EstimateRecord,
    PeriodFee, PhysicalItem, RegimeEstimate,
};

use super::{
    FulfillmentKey, WeightCandidates, classify, convert, removal_fee_for, resolve_bucket,
    resolve_channel_fee, resolve_fulfillment_fee,
};

/// Decimal places of reported shipping and dimensional weights.
pub const WEIGHT_DECIMAL_PLACES: u32 = 3;

/// What a batch run computes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateOptions {
    /// Fee periods; the configured defaults when absent or empty.
    #[serde(default)]
    pub periods: Option<Vec<String>>,
    /// Regime ids; every configured regime when absent or empty.
    #[serde(default)]
    pub regimes: Option<Vec<String>>,
    /// Attach lookup traces to every fee.
    #[serde(default)]
    pub include_trace: bool,
}

/// The resolved selection a batch runs with.
#[derive(Debug, Clone)]
pub struct EstimatePlan<'a> {
    regimes: Vec<&'a Regime>,
    periods: Vec<String>,
    placeholders: &'a [String],
    include_trace: bool,
}

impl<'a> EstimatePlan<'a> {
    /// Resolves options against the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::RegimeNotFound`] for an unknown
    /// regime id.
    pub fn new(config: &'a EngineConfig, options: &EstimateOptions) -> EngineResult<Self> {
        let regimes = match options.regimes.as_deref() {
            Some(ids) if !ids.is_empty() => ids
                .iter()
                .map(|id| config.regime(id))
                .collect::<EngineResult<Vec<_>>>()?,
            _ => config.regimes().iter().collect(),
        };
        let periods = match options.periods.as_deref() {
            Some(periods) if !periods.is_empty() => periods.to_vec(),
            _ => config.periods().to_vec(),
        };

        Ok(Self {
            regimes,
            periods,
            placeholders: config.weight_placeholders(),
            include_trace: options.include_trace,
        })
    }

    /// The fee periods this plan estimates.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }
}

fn round_weight(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(WEIGHT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Estimates one validated item under one regime.
pub fn estimate_regime(regime: &Regime, item: &PhysicalItem, plan: &EstimatePlan<'_>) -> RegimeEstimate {
    let rules = &regime.rules;

    let dimensions = item
        .dimensions
        .map(|v| convert(v, item.dimension_unit, rules.length_unit));
    let actual = convert(item.weight, item.weight_unit, rules.weight_unit);
    let classification = classify(rules, &dimensions, actual);
    let candidates = WeightCandidates::from(&classification);

    debug!(
        item = %item.id,
        regime = %rules.id,
        category = %classification.size_category,
        shipping_weight = %classification.shipping_weight,
        "Classified item"
    );

    let (bucket, issue) = match resolve_bucket(rules, item) {
        Ok(bucket) => (Some(bucket), None),
        Err(e) => {
            warn!(item = %item.id, regime = %rules.id, error = %e, "No rate bucket for item");
            (None, Some(e.to_string()))
        }
    };

    let fulfillment_fees = plan
        .periods
        .iter()
        .map(|period| match &bucket {
            Some(bucket) => {
                let key = FulfillmentKey {
                    period,
                    bucket,
                    size_category: &classification.size_category,
                };
                let lookup =
                    resolve_fulfillment_fee(&regime.fulfillment_table, &key, &candidates, plan.placeholders);
                PeriodFee {
                    period: period.clone(),
                    fee: lookup.fee,
                    trace: plan.include_trace.then_some(lookup.trace),
                }
            }
            None => PeriodFee {
                period: period.clone(),
                fee: None,
                trace: None,
            },
        })
        .collect();

    let channel_fees = if regime.channel_table.is_empty() {
        Vec::new()
    } else {
        DeliverySpeed::ALL
            .iter()
            .map(|&speed| {
                let lookup = resolve_channel_fee(
                    &regime.channel_table,
                    speed,
                    &classification.size_category,
                    &candidates,
                    plan.placeholders,
                );
                ChannelFee {
                    speed,
                    fee: lookup.fee,
                    trace: plan.include_trace.then_some(lookup.trace),
                }
            })
            .collect()
    };

    RegimeEstimate {
        regime: rules.id.clone(),
        removal_fee: removal_fee_for(rules, &classification.size_category, classification.shipping_weight),
        size_category: classification.size_category,
        shipping_weight: round_weight(classification.shipping_weight),
        volumetric_weight: round_weight(classification.volumetric_weight),
        bucket,
        fulfillment_fees,
        channel_fees,
        issue,
    }
}

/// Estimates one catalog record under every regime of the plan.
///
/// `position` is the record's zero-based index in its batch, used to name
/// records without an identifier.
pub fn estimate_record(record: &CatalogRecord, position: usize, plan: &EstimatePlan<'_>) -> EstimateRecord {
    match record.to_item(position) {
        Ok(item) => EstimateRecord {
            regimes: plan
                .regimes
                .iter()
                .map(|regime| estimate_regime(regime, &item, plan))
                .collect(),
            item_id: item.id,
            error: None,
        },
        Err(e) => {
            warn!(position, error = %e, "Skipping invalid catalog record");
            EstimateRecord {
                item_id: record.display_id(position),
                regimes: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Estimates every record of a catalog.
///
/// Output order follows input order, and the same inputs always give the
/// same output.
///
/// # Errors
///
/// Returns an error only when `options` names an unknown regime; invalid
/// records are reported inside the result.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::{EstimateOptions, estimate_catalog};
/// use fba_fee_engine::config::{EngineConfig, EngineMetadata, Regime, RegimeRules};
/// use fba_fee_engine::models::CatalogRecord;
///
/// let config = EngineConfig::new(
///     EngineMetadata { name: "demo".into(), version: "1".into(), description: String::new() },
///     vec!["2024Q1".into()],
///     vec!["发货重量".into()],
///     vec![Regime::new(RegimeRules::eu())],
/// )?;
/// let record = CatalogRecord {
///     id: Some("X001".into()),
///     longest_side: Some("50".into()),
///     median_side: Some("30".into()),
///     shortest_side: Some("20".into()),
///     dimension_unit: Some("cm".into()),
///     weight: Some("10000".into()),
///     weight_unit: Some("g".into()),
///     marketplace: Some("DE".into()),
///     ..Default::default()
/// };
///
/// let batch = estimate_catalog(&config, &[record], &EstimateOptions::default())?;
/// let eu = batch.records[0].regime("EU").unwrap();
/// assert_eq!(eu.size_category, "轻型标准大件");
/// assert_eq!(eu.volumetric_weight.to_string(), "6000");
/// # Ok::<(), fba_fee_engine::error::EngineError>(())
/// ```
pub fn estimate_catalog(
    config: &EngineConfig,
    records: &[CatalogRecord],
    options: &EstimateOptions,
) -> EngineResult<BatchEstimate> {
    let plan = EstimatePlan::new(config, options)?;

    let records: Vec<EstimateRecord> = records
        .iter()
        .enumerate()
        .map(|(position, record)| estimate_record(record, position, &plan))
        .collect();
    let summary = summarize(&records);

    info!(
        records = summary.total_records,
        failed = summary.failed_records,
        unresolved_fees = summary.unresolved_fees,
        regimes = plan.regimes.len(),
        periods = plan.periods.len(),
        "Batch estimate complete"
    );

    Ok(BatchEstimate { records, summary })
}

/// Aggregates per-regime statistics over estimated records.
pub fn summarize(records: &[EstimateRecord]) -> BatchSummary {
    let mut summary = BatchSummary {
        total_records: records.len(),
        ..Default::default()
    };
    let mut fee_sums: BTreeMap<String, BTreeMap<String, (Decimal, u32)>> = BTreeMap::new();

    for record in records {
        if record.error.is_some() {
            summary.failed_records += 1;
        }
        for estimate in &record.regimes {
            *summary
                .category_counts
                .entry(estimate.regime.clone())
                .or_default()
                .entry(estimate.size_category.clone())
                .or_default() += 1;

            for period_fee in &estimate.fulfillment_fees {
                match period_fee.fee {
                    Some(fee) => {
                        let slot = fee_sums
                            .entry(estimate.regime.clone())
                            .or_default()
                            .entry(period_fee.period.clone())
                            .or_insert((Decimal::ZERO, 0));
                        slot.0 = slot.0.saturating_add(fee);
                        slot.1 += 1;
                    }
                    None => summary.unresolved_fees += 1,
                }
            }
            summary.unresolved_fees += estimate.channel_fees.iter().filter(|c| c.fee.is_none()).count();
        }
    }

    summary.mean_fees = fee_sums
        .into_iter()
        .map(|(regime, periods)| {
            let means = periods
                .into_iter()
                .map(|(period, (sum, count))| {
                    let mean = (sum / Decimal::from(count))
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                    (period, mean)
                })
                .collect();
            (regime, means)
        })
        .collect();

    summary
}
