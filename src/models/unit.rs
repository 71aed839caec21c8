//! Measurement units used by catalogs and regimes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a unit measures length or mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A length unit.
    Length,
    /// A mass unit.
    Mass,
}

/// A measurement unit for dimensions or weights.
///
/// # Example
///
/// ```
/// use fba_fee_engine::models::Unit;
///
/// let unit: Unit = "Centimeters".parse().unwrap();
/// assert_eq!(unit, Unit::Centimeters);
/// assert_eq!("lbs".parse::<Unit>().unwrap(), Unit::Pounds);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Centimeters.
    Centimeters,
    /// Inches.
    Inches,
    /// Grams.
    Grams,
    /// Kilograms.
    Kilograms,
    /// Pounds (avoirdupois).
    Pounds,
}

impl Unit {
    /// Returns whether this unit measures length or mass.
    pub fn kind(self) -> UnitKind {
        match self {
            Unit::Centimeters | Unit::Inches => UnitKind::Length,
            Unit::Grams | Unit::Kilograms | Unit::Pounds => UnitKind::Mass,
        }
    }

    /// Returns the canonical lowercase name of the unit.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Centimeters => "centimeters",
            Unit::Inches => "inches",
            Unit::Grams => "grams",
            Unit::Kilograms => "kilograms",
            Unit::Pounds => "pounds",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit text that names no supported unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized unit '{0}'")]
pub struct UnitParseError(pub String);

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "centimeters" | "centimeter" | "centimetres" | "cm" => Ok(Unit::Centimeters),
            "inches" | "inch" | "in" => Ok(Unit::Inches),
            "grams" | "gram" | "g" => Ok(Unit::Grams),
            "kilograms" | "kilogram" | "kg" => Ok(Unit::Kilograms),
            "pounds" | "pound" | "lb" | "lbs" => Ok(Unit::Pounds),
            _ => Err(UnitParseError(s.to_string())),
        }
    }
}
