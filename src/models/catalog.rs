//! Raw catalog records.
//!
//! A [`CatalogRecord`] mirrors one row of a seller inventory export. Every
//! attribute is optional text so that a missing column or a malformed value
//! becomes a per-record error from [`CatalogRecord::to_item`] instead of a
//! failure of the whole catalog.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Dimensions, PhysicalItem, Unit};
use crate::error::{EngineError, EngineResult};

/// One unvalidated catalog row, keyed by the inventory export's column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Catalog key.
    #[serde(rename = "fnsku", default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    /// Sale price.
    #[serde(rename = "sales-price", default, deserialize_with = "lenient_text")]
    pub price: Option<String>,
    /// First dimension.
    #[serde(rename = "longest-side", default, deserialize_with = "lenient_text")]
    pub longest_side: Option<String>,
    /// Second dimension.
    #[serde(rename = "median-side", default, deserialize_with = "lenient_text")]
    pub median_side: Option<String>,
    /// Third dimension.
    #[serde(rename = "shortest-side", default, deserialize_with = "lenient_text")]
    pub shortest_side: Option<String>,
    /// Unit of the three dimensions.
    #[serde(rename = "unit-of-dimension", default, deserialize_with = "lenient_text")]
    pub dimension_unit: Option<String>,
    /// Package weight.
    #[serde(rename = "item-package-weight", default, deserialize_with = "lenient_text")]
    pub weight: Option<String>,
    /// Unit of the package weight.
    #[serde(rename = "unit-of-weight", default, deserialize_with = "lenient_text")]
    pub weight_unit: Option<String>,
    /// Marketplace/store code.
    #[serde(rename = "amazon-store", default, deserialize_with = "lenient_text")]
    pub marketplace: Option<String>,
}

impl CatalogRecord {
    /// Returns the record identifier, or a positional placeholder if absent.
    pub fn display_id(&self, position: usize) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("<row {}>", position + 1),
        }
    }

    /// Validates the record into a [`PhysicalItem`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`] naming the first missing,
    /// non-numeric, negative or unrecognized attribute.
    ///
    /// # Examples
    ///
    /// ```
    /// use fba_fee_engine::models::{CatalogRecord, Unit};
    ///
    /// let record = CatalogRecord {
    ///     id: Some("X001".to_string()),
    ///     longest_side: Some("20".to_string()),
    ///     median_side: Some("50".to_string()),
    ///     shortest_side: Some("30".to_string()),
    ///     dimension_unit: Some("centimeters".to_string()),
    ///     weight: Some("10000".to_string()),
    ///     weight_unit: Some("grams".to_string()),
    ///     marketplace: Some("DE".to_string()),
    ///     ..Default::default()
    /// };
    /// let item = record.to_item(0).unwrap();
    /// assert_eq!(item.dimensions.longest().to_string(), "50");
    /// assert_eq!(item.weight_unit, Unit::Grams);
    /// assert!(item.price.is_none());
    /// ```
    pub fn to_item(&self, position: usize) -> EngineResult<PhysicalItem> {
        let id = self.display_id(position);

        let longest = required_quantity(&id, "longest-side", &self.longest_side)?;
        let median = required_quantity(&id, "median-side", &self.median_side)?;
        let shortest = required_quantity(&id, "shortest-side", &self.shortest_side)?;
        let dimension_unit = required_unit(&id, "unit-of-dimension", &self.dimension_unit)?;
        let weight = required_quantity(&id, "item-package-weight", &self.weight)?;
        let weight_unit = required_unit(&id, "unit-of-weight", &self.weight_unit)?;

        let price = match non_blank(&self.price) {
            Some(text) => Some(parse_quantity(&id, "sales-price", text)?),
            None => None,
        };
        let marketplace = non_blank(&self.marketplace).map(|m| m.to_uppercase());

        Ok(PhysicalItem {
            id,
            dimensions: Dimensions::sorted(longest, median, shortest),
            dimension_unit,
            weight,
            weight_unit,
            price,
            marketplace,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(item_id: &str, field: &str, message: String) -> EngineError {
    EngineError::InvalidRecord {
        item_id: item_id.to_string(),
        field: field.to_string(),
        message,
    }
}

fn required_quantity(item_id: &str, field: &str, value: &Option<String>) -> EngineResult<Decimal> {
    let text = non_blank(value).ok_or_else(|| invalid(item_id, field, "missing value".to_string()))?;
    parse_quantity(item_id, field, text)
}

/// Largest accepted quantity; volumes derived from it stay well inside
/// `Decimal` range.
const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn parse_quantity(item_id: &str, field: &str, text: &str) -> EngineResult<Decimal> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| invalid(item_id, field, format!("not a number: '{}'", text)))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid(item_id, field, format!("negative value: {}", value)));
    }
    if value > MAX_QUANTITY {
        return Err(invalid(item_id, field, format!("exceeds maximum of {}: {}", MAX_QUANTITY, value)));
    }
    Ok(value)
}

fn required_unit(item_id: &str, field: &str, value: &Option<String>) -> EngineResult<Unit> {
    let text = non_blank(value).ok_or_else(|| invalid(item_id, field, "missing value".to_string()))?;
    Unit::from_str(text).map_err(|e| invalid(item_id, field, e.to_string()))
}

/// Scalar shapes a catalog cell can arrive in.
///
/// CSV cells are type-inferred and JSON requests may send numbers, so the
/// record accepts any scalar and keeps its textual form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}
