//! Configuration types for fee estimation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML: the engine settings file and the per-regime
//! threshold tables.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::WeightRange;
use crate::error::{EngineError, EngineResult};
use crate::models::{ChannelRateRow, RateTableRow, Unit, UnitKind};

/// Metadata about the engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetadata {
    /// A short name for this configuration.
    pub name: String,
    /// The version or publication date of the fee schedules.
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Where a regime's rules and tables come from, as listed in `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegimeSource {
    /// The regime id, e.g. "US-2026".
    pub id: String,
    /// Threshold table file relative to the config directory; the builtin
    /// regime of the same id is used when absent.
    #[serde(default)]
    pub rules: Option<String>,
    /// Fulfillment rate table file relative to the config directory.
    #[serde(default)]
    pub fulfillment_table: Option<String>,
    /// Multi-channel rate table file relative to the config directory.
    #[serde(default)]
    pub channel_table: Option<String>,
}

/// The `engine.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Engine metadata.
    pub engine: EngineMetadata,
    /// Periods estimated when a request does not name any.
    #[serde(default = "default_periods")]
    pub periods: Vec<String>,
    /// Tokens in fee formulas that stand for the matched weight.
    #[serde(default = "default_weight_placeholders")]
    pub weight_placeholders: Vec<String>,
    /// The regimes to load, in output order.
    pub regimes: Vec<RegimeSource>,
}

fn default_periods() -> Vec<String> {
    vec!["2024Q1".to_string(), "2024Q2".to_string(), "2024Q3".to_string()]
}

/// The weight placeholder used by the seller-side fee spreadsheets.
pub const DEFAULT_WEIGHT_PLACEHOLDER: &str = "发货重量";

fn default_weight_placeholders() -> Vec<String> {
    vec![DEFAULT_WEIGHT_PLACEHOLDER.to_string()]
}

/// Dimensional weight rule: `volume / divisor × scale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumetricRule {
    /// Volume divisor (139 for inches → pounds, 5000 for cm → kg).
    pub divisor: Decimal,
    /// Multiplier applied after division (1000 turns kilograms into grams).
    #[serde(default = "one")]
    pub scale: Decimal,
}

fn one() -> Decimal {
    Decimal::ONE
}

/// Which weight the classifier compares against weight bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBasis {
    /// The actual package weight.
    Actual,
    /// The greater of actual and dimensional weight.
    GreaterOfActualAndVolumetric,
}

/// A weight band inside an oversize gate.
///
/// A band takes weights strictly above `above`. The last band of a gate also
/// takes everything at or below its bound, so it is inclusive at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OversizeBand {
    /// The category label.
    pub label: String,
    /// Exclusive lower weight bound.
    #[serde(default)]
    pub above: Decimal,
}

/// An oversize gate: trips when any present ceiling is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OversizeGate {
    /// A name for diagnostics, e.g. "special_oversize".
    pub name: String,
    /// Weight ceiling.
    #[serde(default)]
    pub max_weight: Option<Decimal>,
    /// Longest-side ceiling.
    #[serde(default)]
    pub max_longest: Option<Decimal>,
    /// Length-plus-girth ceiling.
    #[serde(default)]
    pub max_length_plus_girth: Option<Decimal>,
    /// Weight bands, heaviest first.
    pub bands: Vec<OversizeBand>,
}

/// A standard tier: admits an item when every present bound holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTier {
    /// The category label.
    pub label: String,
    /// Inclusive weight ceiling.
    #[serde(default)]
    pub max_weight: Option<Decimal>,
    /// Exclusive weight floor.
    #[serde(default)]
    pub min_weight_exclusive: Option<Decimal>,
    /// Inclusive longest-side ceiling.
    #[serde(default)]
    pub max_longest: Option<Decimal>,
    /// Inclusive median-side ceiling.
    #[serde(default)]
    pub max_median: Option<Decimal>,
    /// Inclusive shortest-side ceiling.
    #[serde(default)]
    pub max_shortest: Option<Decimal>,
    /// Inclusive length-plus-girth ceiling.
    #[serde(default)]
    pub max_length_plus_girth: Option<Decimal>,
    /// Inclusive dimensional weight ceiling.
    #[serde(default)]
    pub max_volumetric: Option<Decimal>,
}

/// A price band mapping a sale price range to a rate table bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    /// The bucket label as it appears in the rate table.
    pub label: String,
    /// The price range, in the weight range grammar (e.g. "[10,50]").
    pub range: String,
}

/// How a record's rate table bucket is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingPolicy {
    /// Bucket by sale price.
    PriceBands {
        /// Bands, tried in order.
        bands: Vec<PriceBand>,
        /// The price assumed when a record has none.
        #[serde(default)]
        missing_price: Decimal,
    },
    /// Bucket by marketplace code.
    Marketplace {
        /// Marketplace code → bucket label.
        buckets: BTreeMap<String, String>,
    },
}

/// A stepped removal fee band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalStep {
    /// Inclusive upper weight bound; the lower bound is the previous step's.
    pub up_to: Decimal,
    /// The fee for this band.
    pub fee: Decimal,
}

/// The linear surcharge above the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalSurcharge {
    /// Weight above which the surcharge applies.
    pub threshold: Decimal,
    /// Fee at the threshold.
    pub base: Decimal,
    /// Fee per weight unit above the threshold.
    pub per_unit: Decimal,
}

/// Removal fee bands for one size class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalBands {
    /// Steps, lightest first.
    pub steps: Vec<RemovalStep>,
    /// Surcharge for weights above the last step.
    pub surcharge: RemovalSurcharge,
}

/// The removal fee schedule of a regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalSchedule {
    /// Bands for standard-size categories.
    pub standard: RemovalBands,
    /// Bands for every other category.
    pub oversize: RemovalBands,
}

/// A regime threshold table: everything needed to classify an item and to
/// pick its billing weight and rate bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    /// The regime id, e.g. "US-2026".
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Unit the length thresholds are expressed in.
    pub length_unit: Unit,
    /// Unit the weight thresholds are expressed in.
    pub weight_unit: Unit,
    /// Dimensional weight rule.
    pub volumetric: VolumetricRule,
    /// Weight compared against tier and gate weight bounds.
    pub classification_weight: WeightBasis,
    /// Oversize gates, checked in order before the standard tiers.
    #[serde(default)]
    pub oversize_gates: Vec<OversizeGate>,
    /// Standard tiers, first match wins.
    pub tiers: Vec<SizeTier>,
    /// The category when nothing else matches.
    pub catch_all: String,
    /// Categories billed on actual weight only.
    #[serde(default)]
    pub actual_weight_categories: Vec<String>,
    /// Categories treated as standard size by the removal schedule.
    #[serde(default)]
    pub standard_categories: Vec<String>,
    /// Rate table bucket policy.
    pub pricing: PricingPolicy,
    /// Removal fee schedule, if this regime charges one.
    #[serde(default)]
    pub removal: Option<RemovalSchedule>,
}

impl RegimeRules {
    /// Every category label this regime can produce, deduplicated.
    pub fn categories(&self) -> BTreeSet<&str> {
        let mut labels: BTreeSet<&str> = BTreeSet::new();
        for gate in &self.oversize_gates {
            labels.extend(gate.bands.iter().map(|b| b.label.as_str()));
        }
        labels.extend(self.tiers.iter().map(|t| t.label.as_str()));
        labels.insert(self.catch_all.as_str());
        labels
    }

    /// Checks the table for inconsistencies that would make classification
    /// or billing ill-defined.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRegime`] describing the first problem.
    pub fn validate(&self) -> EngineResult<()> {
        let fail = |message: String| {
            Err(EngineError::InvalidRegime {
                id: self.id.clone(),
                message,
            })
        };

        if self.length_unit.kind() != UnitKind::Length {
            return fail(format!("length_unit '{}' is not a length", self.length_unit));
        }
        if self.weight_unit.kind() != UnitKind::Mass {
            return fail(format!("weight_unit '{}' is not a mass", self.weight_unit));
        }
        if self.volumetric.divisor <= Decimal::ZERO {
            return fail("volumetric divisor must be positive".to_string());
        }
        if self.catch_all.trim().is_empty() {
            return fail("catch_all label is empty".to_string());
        }
        for gate in &self.oversize_gates {
            if gate.bands.is_empty() {
                return fail(format!("oversize gate '{}' has no bands", gate.name));
            }
            if gate.bands.windows(2).any(|w| w[0].above <= w[1].above) {
                return fail(format!(
                    "oversize gate '{}' bands must be ordered heaviest first",
                    gate.name
                ));
            }
        }

        let categories = self.categories();
        for label in self
            .actual_weight_categories
            .iter()
            .chain(self.standard_categories.iter())
        {
            if !categories.contains(label.as_str()) {
                return fail(format!("policy names unknown category '{}'", label));
            }
        }

        if let PricingPolicy::PriceBands { bands, .. } = &self.pricing {
            for band in bands {
                if let Err(e) = WeightRange::parse(&band.range) {
                    return fail(format!("price band '{}': {}", band.label, e));
                }
            }
        }

        if let Some(removal) = &self.removal {
            for (name, bands) in [("standard", &removal.standard), ("oversize", &removal.oversize)] {
                if bands.steps.windows(2).any(|w| w[0].up_to >= w[1].up_to) {
                    return fail(format!("removal {} steps must be ascending", name));
                }
                if let Some(last) = bands.steps.last() {
                    if bands.surcharge.threshold < last.up_to {
                        return fail(format!(
                            "removal {} surcharge threshold is below the last step",
                            name
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// A loaded regime: its rules plus the rate tables tagged for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Regime {
    /// The threshold table.
    pub rules: RegimeRules,
    /// Fulfillment fee rows, in table order.
    pub fulfillment_table: Vec<RateTableRow>,
    /// Multi-channel fee rows, in table order.
    pub channel_table: Vec<ChannelRateRow>,
}

impl Regime {
    /// Creates a regime with empty rate tables.
    pub fn new(rules: RegimeRules) -> Self {
        Self {
            rules,
            fulfillment_table: Vec::new(),
            channel_table: Vec::new(),
        }
    }

    /// Replaces the fulfillment table.
    pub fn with_fulfillment_table(mut self, rows: Vec<RateTableRow>) -> Self {
        self.fulfillment_table = rows;
        self
    }

    /// Replaces the multi-channel table.
    pub fn with_channel_table(mut self, rows: Vec<ChannelRateRow>) -> Self {
        self.channel_table = rows;
        self
    }

    /// The regime id.
    pub fn id(&self) -> &str {
        &self.rules.id
    }
}

/// The complete, immutable engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    periods: Vec<String>,
    weight_placeholders: Vec<String>,
    regimes: Vec<Regime>,
}

impl EngineConfig {
    /// Creates a configuration from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no regimes, a regime id is duplicated,
    /// or a regime fails [`RegimeRules::validate`].
    pub fn new(
        metadata: EngineMetadata,
        periods: Vec<String>,
        weight_placeholders: Vec<String>,
        regimes: Vec<Regime>,
    ) -> EngineResult<Self> {
        if regimes.is_empty() {
            return Err(EngineError::InvalidRegime {
                id: String::new(),
                message: "no regimes configured".to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        for regime in &regimes {
            regime.rules.validate()?;
            if !seen.insert(regime.id()) {
                return Err(EngineError::InvalidRegime {
                    id: regime.id().to_string(),
                    message: "duplicate regime id".to_string(),
                });
            }
        }
        Ok(Self {
            metadata,
            periods,
            weight_placeholders,
            regimes,
        })
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the default periods.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Returns the fee formula weight placeholders.
    pub fn weight_placeholders(&self) -> &[String] {
        &self.weight_placeholders
    }

    /// Returns all regimes in configured order.
    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Looks up a regime by id.
    pub fn regime(&self, id: &str) -> EngineResult<&Regime> {
        self.regimes
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| EngineError::RegimeNotFound { id: id.to_string() })
    }
}
