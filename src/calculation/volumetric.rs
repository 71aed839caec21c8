//! Dimensional (volumetric) weight.

use rust_decimal::Decimal;

use crate::config::VolumetricRule;
use crate::models::Dimensions;

/// Computes the dimensional weight `l·w·h / divisor · scale`.
///
/// Dimensions must already be in the regime's length unit; the result is in
/// the regime's weight unit. A non-positive divisor yields zero.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::volumetric_weight;
/// use fba_fee_engine::config::RegimeRules;
/// use fba_fee_engine::models::Dimensions;
/// use rust_decimal::Decimal;
///
/// let dims = Dimensions::sorted(Decimal::from(50), Decimal::from(30), Decimal::from(20));
/// let grams = volumetric_weight(&dims, &RegimeRules::eu().volumetric);
/// assert_eq!(grams, Decimal::from(6000));
/// ```
pub fn volumetric_weight(dimensions: &Dimensions, rule: &VolumetricRule) -> Decimal {
    if rule.divisor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    dimensions
        .volume()
        .checked_div(rule.divisor)
        .unwrap_or(Decimal::MAX)
        .saturating_mul(rule.scale)
}
