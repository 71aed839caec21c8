//! Core data models for the fee engine.
//!
//! This module contains the catalog input types, rate table rows, and the
//! estimate results produced by the engine.

mod catalog;
mod estimate;
mod item;
mod rate_table;
mod unit;

pub use catalog::CatalogRecord;
pub use estimate::{
    AttemptOutcome, BatchEstimate, BatchSummary, ChannelFee, Classification, EstimateRecord,
    FeeLookup, LookupTrace, PeriodFee, RegimeEstimate, WeightAttempt,
};
pub use item::{Dimensions, PhysicalItem};
pub use rate_table::{ChannelRateRow, DeliverySpeed, RateTableRow, WeightRatedRow};
pub use unit::{Unit, UnitKind, UnitParseError};
