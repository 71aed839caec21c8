//! Builtin regime threshold tables.
//!
//! Category labels are the exact strings used in the seller-side rate
//! tables, since they key every lookup.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::types::{
    OversizeBand, OversizeGate, PriceBand, PricingPolicy, RegimeRules, RemovalBands,
    RemovalSchedule, RemovalStep, RemovalSurcharge, SizeTier, VolumetricRule, WeightBasis,
};
use crate::models::Unit;

/// US size tiers in effect from 2024.
pub const US_2024: &str = "US-2024";
/// US size tiers in effect from 2026.
pub const US_2026: &str = "US-2026";
/// European (UK/DE) size tiers.
pub const EU: &str = "EU";

/// US size category labels.
pub mod us {
    /// Small standard-size.
    pub const SMALL_STANDARD: &str = "小号标准尺寸";
    /// Large standard-size.
    pub const LARGE_STANDARD: &str = "大号标准尺寸";
    /// Small bulky (2026 rules only).
    pub const SMALL_BULKY: &str = "小号大件";
    /// Large bulky.
    pub const LARGE_BULKY: &str = "大号大件";
    /// Extra-large, up to 50 lb.
    pub const OVERSIZE_0_50: &str = "超大件((0,50]磅)";
    /// Extra-large, 50 to 70 lb.
    pub const OVERSIZE_50_70: &str = "超大件((50,70]磅)";
    /// Extra-large, 70 to 150 lb.
    pub const OVERSIZE_70_150: &str = "超大件((70,150]磅)";
    /// Extra-large, over 150 lb.
    pub const OVERSIZE_150_PLUS: &str = "超大件(>150磅)";
}

/// EU size category labels.
pub mod eu {
    /// Light envelope.
    pub const LIGHT_ENVELOPE: &str = "轻型信封";
    /// Standard envelope.
    pub const STANDARD_ENVELOPE: &str = "标准信封";
    /// Large envelope.
    pub const LARGE_ENVELOPE: &str = "大号信封";
    /// Extra-large envelope.
    pub const EXTRA_LARGE_ENVELOPE: &str = "超大号信封";
    /// Small parcel.
    pub const SMALL_PARCEL: &str = "小包裹";
    /// Standard parcel.
    pub const STANDARD_PARCEL: &str = "标准包裹";
    /// Small oversize.
    pub const SMALL_OVERSIZE: &str = "小号大件";
    /// Standard oversize, light.
    pub const STANDARD_OVERSIZE_LIGHT: &str = "轻型标准大件";
    /// Standard oversize, heavy.
    pub const STANDARD_OVERSIZE_HEAVY: &str = "重型标准大件";
    /// Standard oversize, large.
    pub const STANDARD_OVERSIZE_LARGE: &str = "大号标准大件";
    /// Bulky oversize.
    pub const BULKY_OVERSIZE: &str = "特大号大件";
    /// Heavy oversize.
    pub const HEAVY_OVERSIZE: &str = "超重型大件";
    /// Special oversize.
    pub const SPECIAL_OVERSIZE: &str = "特殊大件";
}

fn d(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

fn n(value: i64) -> Decimal {
    Decimal::from(value)
}

/// Dimension-only tier with a weight ceiling.
fn box_tier(label: &str, max_weight: Decimal, longest: Decimal, median: Decimal, shortest: Decimal) -> SizeTier {
    SizeTier {
        label: label.to_string(),
        max_weight: Some(max_weight),
        min_weight_exclusive: None,
        max_longest: Some(longest),
        max_median: Some(median),
        max_shortest: Some(shortest),
        max_length_plus_girth: None,
        max_volumetric: None,
    }
}

fn us_oversize_gate() -> OversizeGate {
    let band = |label: &str, above: i64| OversizeBand {
        label: label.to_string(),
        above: n(above),
    };
    OversizeGate {
        name: "oversize".to_string(),
        max_weight: Some(n(50)),
        max_longest: Some(n(59)),
        max_length_plus_girth: Some(n(130)),
        bands: vec![
            band(us::OVERSIZE_150_PLUS, 150),
            band(us::OVERSIZE_70_150, 70),
            band(us::OVERSIZE_50_70, 50),
            band(us::OVERSIZE_0_50, 0),
        ],
    }
}

fn us_bulky_tier(label: &str, longest: i64, median: i64, shortest: i64) -> SizeTier {
    SizeTier {
        max_length_plus_girth: Some(n(130)),
        ..box_tier(label, n(50), n(longest), n(median), n(shortest))
    }
}

fn us_price_bands() -> PricingPolicy {
    let band = |label: &str| PriceBand {
        label: label.to_string(),
        range: label.to_string(),
    };
    PricingPolicy::PriceBands {
        bands: vec![band("<10"), band("[10,50]"), band(">50")],
        missing_price: Decimal::ZERO,
    }
}

fn us_removal_schedule() -> RemovalSchedule {
    let step = |up_to: Decimal, fee: Decimal| RemovalStep { up_to, fee };
    RemovalSchedule {
        standard: RemovalBands {
            steps: vec![
                step(d(5, 1), d(84, 2)),
                step(n(1), d(153, 2)),
                step(n(2), d(227, 2)),
            ],
            surcharge: RemovalSurcharge {
                threshold: n(2),
                base: d(289, 2),
                per_unit: d(106, 2),
            },
        },
        oversize: RemovalBands {
            steps: vec![
                step(n(1), d(312, 2)),
                step(n(2), d(430, 2)),
                step(n(4), d(636, 2)),
                step(n(10), d(1004, 2)),
            ],
            surcharge: RemovalSurcharge {
                threshold: n(10),
                base: d(1432, 2),
                per_unit: d(106, 2),
            },
        },
    }
}

fn us_rules(id: &str, description: &str, tiers: Vec<SizeTier>, removal: Option<RemovalSchedule>) -> RegimeRules {
    RegimeRules {
        id: id.to_string(),
        description: description.to_string(),
        length_unit: Unit::Inches,
        weight_unit: Unit::Pounds,
        volumetric: VolumetricRule {
            divisor: n(139),
            scale: Decimal::ONE,
        },
        classification_weight: WeightBasis::GreaterOfActualAndVolumetric,
        oversize_gates: vec![us_oversize_gate()],
        tiers,
        catch_all: us::OVERSIZE_0_50.to_string(),
        actual_weight_categories: vec![
            us::SMALL_STANDARD.to_string(),
            us::OVERSIZE_150_PLUS.to_string(),
        ],
        standard_categories: vec![us::SMALL_STANDARD.to_string(), us::LARGE_STANDARD.to_string()],
        pricing: us_price_bands(),
        removal,
    }
}

impl RegimeRules {
    /// US size tiers in effect from 2024.
    pub fn us_2024() -> Self {
        us_rules(
            US_2024,
            "US marketplace size tiers, 2024 rules",
            vec![
                box_tier(us::SMALL_STANDARD, n(1), n(15), n(12), d(75, 2)),
                box_tier(us::LARGE_STANDARD, n(20), n(18), n(14), n(8)),
                us_bulky_tier(us::LARGE_BULKY, 59, 33, 33),
            ],
            None,
        )
    }

    /// US size tiers in effect from 2026, which add a small bulky tier.
    pub fn us_2026() -> Self {
        us_rules(
            US_2026,
            "US marketplace size tiers, 2026 rules",
            vec![
                box_tier(us::SMALL_STANDARD, n(1), n(15), n(12), d(75, 2)),
                box_tier(us::LARGE_STANDARD, n(20), n(18), n(14), n(8)),
                us_bulky_tier(us::SMALL_BULKY, 37, 28, 20),
                us_bulky_tier(us::LARGE_BULKY, 59, 33, 33),
            ],
            Some(us_removal_schedule()),
        )
    }

    /// European (UK/DE) size tiers.
    pub fn eu() -> Self {
        let parcel = |label: &str, longest: i64, median: i64, shortest: i64, weight: i64, volumetric: i64| SizeTier {
            max_volumetric: Some(n(volumetric)),
            ..box_tier(label, n(weight), n(longest), n(median), n(shortest))
        };
        let unbounded = |label: &str, weight: i64, volumetric: i64| SizeTier {
            label: label.to_string(),
            max_weight: Some(n(weight)),
            min_weight_exclusive: None,
            max_longest: None,
            max_median: None,
            max_shortest: None,
            max_length_plus_girth: None,
            max_volumetric: Some(n(volumetric)),
        };

        let envelopes = [
            eu::LIGHT_ENVELOPE,
            eu::STANDARD_ENVELOPE,
            eu::LARGE_ENVELOPE,
            eu::EXTRA_LARGE_ENVELOPE,
        ];

        RegimeRules {
            id: EU.to_string(),
            description: "European marketplace size tiers (UK, DE)".to_string(),
            length_unit: Unit::Centimeters,
            weight_unit: Unit::Grams,
            volumetric: VolumetricRule {
                divisor: n(5000),
                scale: n(1000),
            },
            classification_weight: WeightBasis::Actual,
            oversize_gates: vec![OversizeGate {
                name: "special_oversize".to_string(),
                max_weight: Some(n(31500)),
                max_longest: Some(n(175)),
                max_length_plus_girth: Some(n(360)),
                bands: vec![OversizeBand {
                    label: eu::SPECIAL_OVERSIZE.to_string(),
                    above: Decimal::ZERO,
                }],
            }],
            tiers: vec![
                box_tier(eu::LIGHT_ENVELOPE, n(100), n(33), n(23), d(25, 1)),
                box_tier(eu::STANDARD_ENVELOPE, n(460), n(33), n(23), d(25, 1)),
                box_tier(eu::LARGE_ENVELOPE, n(960), n(33), n(23), n(4)),
                box_tier(eu::EXTRA_LARGE_ENVELOPE, n(960), n(33), n(23), n(6)),
                parcel(eu::SMALL_PARCEL, 35, 25, 12, 3900, 2100),
                parcel(eu::STANDARD_PARCEL, 45, 34, 26, 11900, 7960),
                parcel(eu::SMALL_OVERSIZE, 61, 46, 46, 1760, 25820),
                parcel(eu::STANDARD_OVERSIZE_LIGHT, 101, 60, 60, 15000, 72720),
                SizeTier {
                    min_weight_exclusive: Some(n(15000)),
                    ..parcel(eu::STANDARD_OVERSIZE_HEAVY, 101, 60, 60, 23000, 72720)
                },
                parcel(eu::STANDARD_OVERSIZE_LARGE, 120, 60, 60, 23000, 86400),
                unbounded(eu::BULKY_OVERSIZE, 23000, 126000),
                unbounded(eu::HEAVY_OVERSIZE, 31500, 126000),
            ],
            catch_all: eu::SPECIAL_OVERSIZE.to_string(),
            actual_weight_categories: envelopes
                .iter()
                .chain([eu::SPECIAL_OVERSIZE].iter())
                .map(|s| s.to_string())
                .collect(),
            standard_categories: envelopes
                .iter()
                .chain([eu::SMALL_PARCEL, eu::STANDARD_PARCEL].iter())
                .map(|s| s.to_string())
                .collect(),
            pricing: PricingPolicy::Marketplace {
                buckets: BTreeMap::from([
                    ("DE".to_string(), "德国".to_string()),
                    ("GB".to_string(), "英国".to_string()),
                ]),
            },
            removal: None,
        }
    }

    /// Returns the builtin regime with the given id.
    pub fn builtin(id: &str) -> Option<Self> {
        match id {
            US_2024 => Some(Self::us_2024()),
            US_2026 => Some(Self::us_2026()),
            EU => Some(Self::eu()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for id in [US_2024, US_2026, EU] {
            let rules = RegimeRules::builtin(id).unwrap();
            assert_eq!(rules.id, id);
            rules.validate().unwrap();
        }
    }

    #[test]
    fn test_each_id_names_its_own_rules() {
        assert_eq!(RegimeRules::us_2024().id, US_2024);
        assert_eq!(RegimeRules::us_2026().id, US_2026);
        assert_eq!(RegimeRules::eu().id, EU);
        assert_ne!(US_2024, US_2026);
        assert_ne!(US_2026, EU);
    }

    #[test]
    fn test_unknown_builtin_is_none() {
        assert!(RegimeRules::builtin("JP-2025").is_none());
    }

    #[test]
    fn test_us_2026_adds_small_bulky() {
        assert!(!RegimeRules::us_2024().categories().contains(us::SMALL_BULKY));
        assert!(RegimeRules::us_2026().categories().contains(us::SMALL_BULKY));
    }

    #[test]
    fn test_eu_has_thirteen_categories() {
        assert_eq!(RegimeRules::eu().categories().len(), 13);
    }

    #[test]
    fn test_only_us_2026_charges_removal() {
        assert!(RegimeRules::us_2024().removal.is_none());
        assert!(RegimeRules::us_2026().removal.is_some());
        assert!(RegimeRules::eu().removal.is_none());
    }

    #[test]
    fn test_validate_rejects_unknown_policy_category() {
        let mut rules = RegimeRules::us_2024();
        rules.actual_weight_categories.push("特殊大件".to_string());
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("unknown category '特殊大件'"));
    }

    #[test]
    fn test_validate_rejects_unordered_bands() {
        let mut rules = RegimeRules::us_2026();
        rules.oversize_gates[0].bands.reverse();
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let mut rules = RegimeRules::eu();
        rules.volumetric.divisor = Decimal::ZERO;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rules_round_trip_through_yaml() {
        let rules = RegimeRules::eu();
        let yaml = serde_yaml::to_string(&rules).unwrap();
        let parsed: RegimeRules = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, rules);
    }
}
