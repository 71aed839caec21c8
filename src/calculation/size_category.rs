//! Size category classification.
//!
//! Every regime is classified by the same cascade, driven by its threshold
//! table:
//!
//! 1. Oversize gates, in order. A gate trips when any of its ceilings is
//!    exceeded (weight, longest side, or length plus girth). A tripped gate
//!    picks the first band whose exclusive lower bound the weight exceeds,
//!    falling through to its last band.
//! 2. Standard tiers, first match wins. A tier admits an item when every
//!    bound it declares holds.
//! 3. The regime's catch-all label.

use rust_decimal::Decimal;

use crate::config::{OversizeGate, RegimeRules, SizeTier, WeightBasis};
use crate::models::{Classification, Dimensions};

use super::{resolve_shipping_weight, volumetric_weight};

fn exceeds(value: Decimal, ceiling: Option<Decimal>) -> bool {
    ceiling.is_some_and(|c| value > c)
}

fn within(value: Decimal, ceiling: Option<Decimal>) -> bool {
    ceiling.is_none_or(|c| value <= c)
}

fn gate_trips(gate: &OversizeGate, dimensions: &Dimensions, weight: Decimal) -> bool {
    exceeds(weight, gate.max_weight)
        || exceeds(dimensions.longest(), gate.max_longest)
        || exceeds(dimensions.length_plus_girth(), gate.max_length_plus_girth)
}

fn gate_band(gate: &OversizeGate, weight: Decimal) -> Option<&str> {
    gate.bands
        .iter()
        .find(|band| weight > band.above)
        .or_else(|| gate.bands.last())
        .map(|band| band.label.as_str())
}

fn tier_admits(tier: &SizeTier, dimensions: &Dimensions, weight: Decimal, volumetric: Decimal) -> bool {
    within(weight, tier.max_weight)
        && tier.min_weight_exclusive.is_none_or(|floor| weight > floor)
        && within(dimensions.longest(), tier.max_longest)
        && within(dimensions.median(), tier.max_median)
        && within(dimensions.shortest(), tier.max_shortest)
        && within(dimensions.length_plus_girth(), tier.max_length_plus_girth)
        && within(volumetric, tier.max_volumetric)
}

/// The weight compared against gate and tier weight bounds.
pub fn classification_weight(rules: &RegimeRules, actual: Decimal, volumetric: Decimal) -> Decimal {
    match rules.classification_weight {
        WeightBasis::Actual => actual,
        WeightBasis::GreaterOfActualAndVolumetric => actual.max(volumetric),
    }
}

/// Determines the size category of an item.
///
/// Dimensions and weights must be in the regime's units. The function is
/// total: it always returns one of [`RegimeRules::categories`].
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::determine_size_category;
/// use fba_fee_engine::config::{RegimeRules, us};
/// use fba_fee_engine::models::Dimensions;
/// use rust_decimal::Decimal;
///
/// let rules = RegimeRules::us_2026();
/// let dims = Dimensions::sorted(Decimal::from(10), Decimal::from(8), Decimal::new(5, 1));
/// let category = determine_size_category(&rules, &dims, Decimal::new(5, 1), Decimal::new(29, 2));
/// assert_eq!(category, us::SMALL_STANDARD);
/// ```
pub fn determine_size_category<'a>(
    rules: &'a RegimeRules,
    dimensions: &Dimensions,
    actual: Decimal,
    volumetric: Decimal,
) -> &'a str {
    let weight = classification_weight(rules, actual, volumetric);

    for gate in &rules.oversize_gates {
        if gate_trips(gate, dimensions, weight) {
            if let Some(label) = gate_band(gate, weight) {
                return label;
            }
        }
    }

    rules
        .tiers
        .iter()
        .find(|tier| tier_admits(tier, dimensions, weight, volumetric))
        .map(|tier| tier.label.as_str())
        .unwrap_or(rules.catch_all.as_str())
}

/// Classifies an item under a regime: dimensional weight, size category
/// and shipping weight.
///
/// Dimensions and actual weight must already be in the regime's units.
pub fn classify(rules: &RegimeRules, dimensions: &Dimensions, actual: Decimal) -> Classification {
    let volumetric = volumetric_weight(dimensions, &rules.volumetric);
    let category = determine_size_category(rules, dimensions, actual, volumetric);
    let shipping_weight = resolve_shipping_weight(actual, volumetric, category, rules);

    Classification {
        size_category: category.to_string(),
        shipping_weight,
        volumetric_weight: volumetric,
        actual_weight: actual,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::RegimeRules;
    use proptest::prelude::*;

    // -- Strategy helpers --

    fn arb_magnitude(max_hundredths: i64) -> impl Strategy<Value = Decimal> {
        (0..=max_hundredths).prop_map(|v| Decimal::new(v, 2))
    }

    fn arb_rules() -> impl Strategy<Value = RegimeRules> {
        prop_oneof![
            Just(RegimeRules::us_2024()),
            Just(RegimeRules::us_2026()),
            Just(RegimeRules::eu()),
        ]
    }

    fn gate_labels(rules: &RegimeRules) -> Vec<&str> {
        rules
            .oversize_gates
            .iter()
            .flat_map(|g| g.bands.iter().map(|b| b.label.as_str()))
            .collect()
    }

    proptest! {
        /// Every classification is one of the regime's categories.
        #[test]
        fn classification_is_total(
            rules in arb_rules(),
            a in arb_magnitude(30_000),
            b in arb_magnitude(30_000),
            c in arb_magnitude(30_000),
            w in arb_magnitude(5_000_000),
        ) {
            let result = classify(&rules, &Dimensions::sorted(a, b, c), w);
            prop_assert!(rules.categories().contains(result.size_category.as_str()));
        }

        /// Growing one side never takes an oversize item back to a standard tier.
        #[test]
        fn oversize_is_monotonic_in_dimension(
            rules in arb_rules(),
            a in arb_magnitude(30_000),
            b in arb_magnitude(30_000),
            c in arb_magnitude(30_000),
            w in arb_magnitude(5_000_000),
            extra in arb_magnitude(30_000),
        ) {
            let gates = gate_labels(&rules);
            let smaller = classify(&rules, &Dimensions::sorted(a, b, c), w);
            let larger = classify(&rules, &Dimensions::sorted(a + extra, b, c), w);
            if gates.contains(&smaller.size_category.as_str()) {
                prop_assert!(
                    gates.contains(&larger.size_category.as_str()),
                    "{} -> {}",
                    smaller.size_category,
                    larger.size_category
                );
            }
        }

        /// Adding weight never takes an oversize item back to a standard tier.
        #[test]
        fn oversize_is_monotonic_in_weight(
            rules in arb_rules(),
            a in arb_magnitude(30_000),
            b in arb_magnitude(30_000),
            c in arb_magnitude(30_000),
            w in arb_magnitude(5_000_000),
            extra in arb_magnitude(5_000_000),
        ) {
            let d = Dimensions::sorted(a, b, c);
            let labels = gate_labels(&rules);
            let lighter = classify(&rules, &d, w);
            let heavier = classify(&rules, &d, w + extra);
            if labels.contains(&lighter.size_category.as_str()) {
                prop_assert!(labels.contains(&heavier.size_category.as_str()));
            }
        }
    }
}
