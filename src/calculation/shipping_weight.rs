//! Shipping (billing) weight resolution.

use rust_decimal::Decimal;

use crate::config::RegimeRules;

/// Resolves the weight that governs billing for a classified item.
///
/// Categories in the regime's actual-weight set bill on the actual weight;
/// every other category bills on the greater of actual and dimensional
/// weight.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::resolve_shipping_weight;
/// use fba_fee_engine::config::{RegimeRules, us};
/// use rust_decimal::Decimal;
///
/// let rules = RegimeRules::us_2026();
/// let actual = Decimal::new(5, 1);
/// let volumetric = Decimal::new(9, 1);
///
/// assert_eq!(resolve_shipping_weight(actual, volumetric, us::SMALL_STANDARD, &rules), actual);
/// assert_eq!(resolve_shipping_weight(actual, volumetric, us::LARGE_STANDARD, &rules), volumetric);
/// ```
pub fn resolve_shipping_weight(
    actual: Decimal,
    volumetric: Decimal,
    category: &str,
    rules: &RegimeRules,
) -> Decimal {
    if rules
        .actual_weight_categories
        .iter()
        .any(|c| c == category)
    {
        actual
    } else {
        actual.max(volumetric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{eu, us};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_us_heaviest_oversize_bills_actual() {
        let rules = RegimeRules::us_2024();
        assert_eq!(
            resolve_shipping_weight(dec("160"), dec("200"), us::OVERSIZE_150_PLUS, &rules),
            dec("160")
        );
        assert_eq!(
            resolve_shipping_weight(dec("60"), dec("65"), us::OVERSIZE_50_70, &rules),
            dec("65")
        );
    }

    #[test]
    fn test_eu_envelope_bills_actual() {
        let rules = RegimeRules::eu();
        assert_eq!(
            resolve_shipping_weight(dec("80"), dec("300"), eu::LIGHT_ENVELOPE, &rules),
            dec("80")
        );
        assert_eq!(
            resolve_shipping_weight(dec("10000"), dec("6000"), eu::STANDARD_OVERSIZE_LIGHT, &rules),
            dec("10000")
        );
        assert_eq!(
            resolve_shipping_weight(dec("400"), dec("900"), eu::SMALL_PARCEL, &rules),
            dec("900")
        );
    }

    #[test]
    fn test_max_when_volumetric_smaller() {
        let rules = RegimeRules::us_2026();
        assert_eq!(
            resolve_shipping_weight(dec("3"), dec("1"), us::LARGE_STANDARD, &rules),
            dec("3")
        );
    }
}
