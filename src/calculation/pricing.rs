//! Rate table bucket selection.
//!
//! US fulfillment tables are split by sale price band, European tables by
//! marketplace country. Which one applies is regime data.

use rust_decimal::Decimal;

use crate::config::{PricingPolicy, RegimeRules};
use crate::error::{EngineError, EngineResult};
use crate::models::PhysicalItem;

use super::WeightRange;

/// Picks the rate table bucket for an item under a regime.
///
/// # Errors
///
/// - [`EngineError::InvalidRecord`] when the item lacks the attribute the
///   policy needs, or its price falls in no band.
/// - [`EngineError::UnknownMarketplace`] when the marketplace has no bucket.
/// - [`EngineError::InvalidRegime`] when a price band range does not parse.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::resolve_bucket;
/// use fba_fee_engine::config::RegimeRules;
/// use fba_fee_engine::models::{Dimensions, PhysicalItem, Unit};
/// use rust_decimal::Decimal;
///
/// let item = PhysicalItem {
///     id: "X001".to_string(),
///     dimensions: Dimensions::sorted(Decimal::ONE, Decimal::ONE, Decimal::ONE),
///     dimension_unit: Unit::Inches,
///     weight: Decimal::ONE,
///     weight_unit: Unit::Pounds,
///     price: Some(Decimal::from(10)),
///     marketplace: None,
/// };
/// assert_eq!(resolve_bucket(&RegimeRules::us_2024(), &item).unwrap(), "[10,50]");
/// ```
pub fn resolve_bucket(rules: &RegimeRules, item: &PhysicalItem) -> EngineResult<String> {
    match &rules.pricing {
        PricingPolicy::PriceBands {
            bands,
            missing_price,
        } => {
            let price: Decimal = item.price.unwrap_or(*missing_price);
            for band in bands {
                let range = WeightRange::parse(&band.range).map_err(|e| EngineError::InvalidRegime {
                    id: rules.id.clone(),
                    message: format!("price band '{}': {}", band.label, e),
                })?;
                if range.accepts(price) {
                    return Ok(band.label.clone());
                }
            }
            Err(EngineError::InvalidRecord {
                item_id: item.id.clone(),
                field: "sales-price".to_string(),
                message: format!("no price band for {}", price),
            })
        }
        PricingPolicy::Marketplace { buckets } => {
            let marketplace = item.marketplace.as_deref().ok_or_else(|| EngineError::InvalidRecord {
                item_id: item.id.clone(),
                field: "amazon-store".to_string(),
                message: "marketplace is required".to_string(),
            })?;
            buckets
                .get(marketplace)
                .cloned()
                .ok_or_else(|| EngineError::UnknownMarketplace {
                    marketplace: marketplace.to_string(),
                    regime: rules.id.clone(),
                })
        }
    }
}
