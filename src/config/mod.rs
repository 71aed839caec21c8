//! Configuration loading and management for the fee engine.
//!
//! This module provides the regime threshold tables, the builtin regimes,
//! and the loader that assembles them with their rate tables from a YAML
//! configuration directory.
//!
//! # Example
//!
//! ```no_run
//! use fba_fee_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/fba").unwrap();
//! println!("Loaded: {}", loader.metadata().name);
//! ```

mod loader;
mod regimes;
mod types;

pub use loader::ConfigLoader;
pub use regimes::{EU, US_2024, US_2026, eu, us};
pub use types::{
    DEFAULT_WEIGHT_PLACEHOLDER, EngineConfig, EngineMetadata, EngineSettings, OversizeBand,
    OversizeGate, PriceBand, PricingPolicy, Regime, RegimeRules, RegimeSource, RemovalBands,
    RemovalSchedule, RemovalStep, RemovalSurcharge, SizeTier, VolumetricRule, WeightBasis,
};
