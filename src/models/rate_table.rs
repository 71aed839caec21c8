//! Rate table rows.
//!
//! Rate tables are authored as spreadsheets, so the weight range and the fee
//! stay as untyped text here. They are interpreted at lookup time by
//! [`crate::calculation::WeightRange`] and [`crate::calculation::FeeExpression`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A row that prices a weight range.
pub trait WeightRatedRow {
    /// The weight range specifier, e.g. `"(3,20]磅"`.
    fn weight_range(&self) -> &str;
    /// The fee specifier, a literal amount or a formula over the weight.
    fn fee(&self) -> &str;
}

/// One row of a fulfillment fee table.
///
/// Column headers may be the English field names or the headers used by the
/// seller-side spreadsheets (`时期`, `商品价格`/`国家`, `商品尺寸`, `发货重量`,
/// `FBA费用`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTableRow {
    /// Effective period, e.g. "2024Q1".
    #[serde(alias = "时期")]
    pub period: String,
    /// Pricing bucket or country bucket, e.g. "[10,50]" or "德国".
    #[serde(alias = "商品价格", alias = "国家")]
    pub bucket: String,
    /// Size category label.
    #[serde(alias = "商品尺寸")]
    pub size_category: String,
    /// Weight range specifier.
    #[serde(alias = "发货重量")]
    pub weight_range: String,
    /// Fee specifier.
    #[serde(alias = "FBA费用")]
    pub fee: String,
}

impl WeightRatedRow for RateTableRow {
    fn weight_range(&self) -> &str {
        &self.weight_range
    }

    fn fee(&self) -> &str {
        &self.fee
    }
}

/// Delivery speed of a multi-channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySpeed {
    /// Standard delivery.
    Standard,
    /// Expedited delivery.
    Express,
}

impl DeliverySpeed {
    /// All speeds, in output order.
    pub const ALL: [DeliverySpeed; 2] = [DeliverySpeed::Standard, DeliverySpeed::Express];

    /// The label used in the channel rate table's speed column.
    pub fn table_label(self) -> &'static str {
        match self {
            DeliverySpeed::Standard => "标准",
            DeliverySpeed::Express => "加急",
        }
    }

    /// Matches a rate table speed cell.
    pub fn matches(self, cell: &str) -> bool {
        let cell = cell.trim();
        cell == self.table_label()
            || cell.eq_ignore_ascii_case(match self {
                DeliverySpeed::Standard => "standard",
                DeliverySpeed::Express => "express",
            })
    }
}

impl fmt::Display for DeliverySpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliverySpeed::Standard => f.write_str("standard"),
            DeliverySpeed::Express => f.write_str("express"),
        }
    }
}

/// One row of a multi-channel delivery fee table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRateRow {
    /// Delivery speed cell, e.g. "标准".
    #[serde(alias = "配送方式")]
    pub speed: String,
    /// Size category label.
    #[serde(alias = "商品尺寸")]
    pub size_category: String,
    /// Weight range specifier.
    #[serde(alias = "发货重量")]
    pub weight_range: String,
    /// Fee specifier.
    #[serde(alias = "多渠道配送费")]
    pub fee: String,
}

impl WeightRatedRow for ChannelRateRow {
    fn weight_range(&self) -> &str {
        &self.weight_range
    }

    fn fee(&self) -> &str {
        &self.fee
    }
}
