//! Table-driven fee resolution.
//!
//! A lookup filters a rate table by its categorical keys, then scans the
//! remaining rows in table order for the first whose weight range accepts
//! the shipping weight. When no range accepts it, the scan is repeated with
//! the actual weight and then the dimensional weight, skipping any weight
//! already tried.
//!
//! A matched row whose fee cannot be evaluated ends the attempt for that
//! weight; later rows are not consulted for it.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{
    AttemptOutcome, Classification, FeeLookup, LookupTrace, RateTableRow, WeightAttempt,
    WeightRatedRow,
};

use super::{FeeExpression, WeightRange};

/// Name of the shipping weight candidate in lookup traces.
pub const SHIPPING_WEIGHT: &str = "shipping";
/// Name of the actual weight candidate in lookup traces.
pub const ACTUAL_WEIGHT: &str = "actual";
/// Name of the dimensional weight candidate in lookup traces.
pub const VOLUMETRIC_WEIGHT: &str = "volumetric";

/// The weights a lookup may try, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightCandidates {
    /// The resolved shipping weight; always tried first.
    pub shipping: Decimal,
    /// The actual weight; first fallback.
    pub actual: Decimal,
    /// The dimensional weight; second fallback.
    pub volumetric: Decimal,
}

impl WeightCandidates {
    /// Creates a candidate set.
    pub fn new(shipping: Decimal, actual: Decimal, volumetric: Decimal) -> Self {
        Self {
            shipping,
            actual,
            volumetric,
        }
    }

    /// The distinct candidates in try order.
    pub fn ordered(&self) -> Vec<(&'static str, Decimal)> {
        let mut tried: Vec<(&'static str, Decimal)> = Vec::with_capacity(3);
        for (source, weight) in [
            (SHIPPING_WEIGHT, self.shipping),
            (ACTUAL_WEIGHT, self.actual),
            (VOLUMETRIC_WEIGHT, self.volumetric),
        ] {
            if !tried.iter().any(|(_, w)| *w == weight) {
                tried.push((source, weight));
            }
        }
        tried
    }
}

impl From<&Classification> for WeightCandidates {
    fn from(classification: &Classification) -> Self {
        Self::new(
            classification.shipping_weight,
            classification.actual_weight,
            classification.volumetric_weight,
        )
    }
}

/// The categorical key of a fulfillment table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentKey<'a> {
    /// The fee period, e.g. "2024Q1".
    pub period: &'a str,
    /// The price or country bucket.
    pub bucket: &'a str,
    /// The size category.
    pub size_category: &'a str,
}

/// Compares two key cells, ignoring whitespace.
pub(crate) fn key_matches(cell: &str, key: &str) -> bool {
    cell.chars()
        .filter(|c| !c.is_whitespace())
        .eq(key.chars().filter(|c| !c.is_whitespace()))
}

/// Resolves a fee from already-filtered rows.
///
/// `rows` pairs each row with its index in the full table, for tracing.
pub fn resolve_from_rows<R: WeightRatedRow>(
    rows: &[(usize, &R)],
    candidates: &WeightCandidates,
    placeholders: &[String],
) -> FeeLookup {
    let mut trace = LookupTrace {
        rows_considered: rows.len(),
        attempts: Vec::new(),
    };

    if rows.is_empty() {
        return FeeLookup { fee: None, trace };
    }

    // Parse each range once; a malformed range never matches.
    let ranges: Vec<Option<WeightRange>> = rows
        .iter()
        .map(|(index, row)| match WeightRange::parse(row.weight_range()) {
            Ok(range) => Some(range),
            Err(e) => {
                warn!(row = index, range = row.weight_range(), error = %e, "Malformed weight range");
                None
            }
        })
        .collect();
    let unparseable_ranges = ranges.iter().filter(|r| r.is_none()).count();

    for (source, weight) in candidates.ordered() {
        let hit = rows
            .iter()
            .zip(&ranges)
            .find(|(_, range)| range.is_some_and(|r| r.accepts(weight)))
            .map(|(row, _)| *row);

        let Some((index, row)) = hit else {
            debug!(source, %weight, "No weight range matched");
            trace.attempts.push(WeightAttempt {
                source: source.to_string(),
                weight,
                outcome: AttemptOutcome::NoRangeMatched { unparseable_ranges },
            });
            continue;
        };

        match FeeExpression::parse(row.fee()).and_then(|fee| fee.evaluate(weight, placeholders)) {
            Ok(fee) => {
                debug!(source, %weight, row = index, %fee, "Matched rate row");
                trace.attempts.push(WeightAttempt {
                    source: source.to_string(),
                    weight,
                    outcome: AttemptOutcome::Matched {
                        row: index,
                        weight_range: row.weight_range().to_string(),
                        fee_spec: row.fee().to_string(),
                        fee,
                    },
                });
                return FeeLookup {
                    fee: Some(fee),
                    trace,
                };
            }
            Err(e) => {
                warn!(source, %weight, row = index, fee = row.fee(), error = %e, "Fee could not be evaluated");
                trace.attempts.push(WeightAttempt {
                    source: source.to_string(),
                    weight,
                    outcome: AttemptOutcome::FeeUnresolved {
                        row: index,
                        fee_spec: row.fee().to_string(),
                        reason: e.to_string(),
                    },
                });
            }
        }
    }

    FeeLookup { fee: None, trace }
}

/// Resolves a fulfillment fee from a regime's fulfillment table.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::{FulfillmentKey, WeightCandidates, resolve_fulfillment_fee};
/// use fba_fee_engine::models::RateTableRow;
/// use rust_decimal::Decimal;
///
/// let table = vec![RateTableRow {
///     period: "2024Q1".to_string(),
///     bucket: "[10,50]".to_string(),
///     size_category: "大号标准尺寸".to_string(),
///     weight_range: "(3,20]磅".to_string(),
///     fee: "$6.92+0.08*(发货重量-3)*2".to_string(),
/// }];
/// let key = FulfillmentKey { period: "2024Q1", bucket: "[10,50]", size_category: "大号标准尺寸" };
/// let weight = Decimal::from(4);
/// let lookup = resolve_fulfillment_fee(
///     &table,
///     &key,
///     &WeightCandidates::new(weight, weight, weight),
///     &["发货重量".to_string()],
/// );
/// assert_eq!(lookup.fee, Some(Decimal::new(708, 2)));
/// ```
pub fn resolve_fulfillment_fee(
    table: &[RateTableRow],
    key: &FulfillmentKey<'_>,
    candidates: &WeightCandidates,
    placeholders: &[String],
) -> FeeLookup {
    let rows: Vec<(usize, &RateTableRow)> = table
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            key_matches(&row.period, key.period)
                && key_matches(&row.bucket, key.bucket)
                && key_matches(&row.size_category, key.size_category)
        })
        .collect();

    if rows.is_empty() {
        warn!(
            period = key.period,
            bucket = key.bucket,
            size_category = key.size_category,
            "No fulfillment rows for key"
        );
    }

    let lookup = resolve_from_rows(&rows, candidates, placeholders);
    if !lookup.is_resolved() && !rows.is_empty() {
        warn!(
            period = key.period,
            bucket = key.bucket,
            size_category = key.size_category,
            shipping_weight = %candidates.shipping,
            "Fulfillment fee unresolved"
        );
    }
    lookup
}
