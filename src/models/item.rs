//! Physical item model.
//!
//! A [`PhysicalItem`] is one validated catalog entry: three unordered
//! dimension magnitudes, an actual weight, the units they were declared in,
//! and the optional price and marketplace used for rate-table bucketing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Unit;

/// Dimensions sorted from longest to shortest.
///
/// Classification thresholds always apply to the sorted triple, so the only
/// way to build one is through [`Dimensions::sorted`]. Deserialized sides
/// are re-sorted the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SideTriple")]
pub struct Dimensions {
    longest: Decimal,
    median: Decimal,
    shortest: Decimal,
}

#[derive(Deserialize)]
struct SideTriple {
    longest: Decimal,
    median: Decimal,
    shortest: Decimal,
}

impl From<SideTriple> for Dimensions {
    fn from(sides: SideTriple) -> Self {
        Self::sorted(sides.longest, sides.median, sides.shortest)
    }
}

impl Dimensions {
    /// Sorts three dimension magnitudes into longest/median/shortest order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fba_fee_engine::models::Dimensions;
    /// use rust_decimal::Decimal;
    ///
    /// let dims = Dimensions::sorted(Decimal::from(20), Decimal::from(50), Decimal::from(30));
    /// assert_eq!(dims.longest(), Decimal::from(50));
    /// assert_eq!(dims.median(), Decimal::from(30));
    /// assert_eq!(dims.shortest(), Decimal::from(20));
    /// ```
    pub fn sorted(a: Decimal, b: Decimal, c: Decimal) -> Self {
        let mut sides = [a, b, c];
        sides.sort_unstable_by(|x, y| y.cmp(x));
        Self {
            longest: sides[0],
            median: sides[1],
            shortest: sides[2],
        }
    }

    /// The longest side.
    pub fn longest(&self) -> Decimal {
        self.longest
    }

    /// The second-longest side.
    pub fn median(&self) -> Decimal {
        self.median
    }

    /// The shortest side.
    pub fn shortest(&self) -> Decimal {
        self.shortest
    }

    /// Length plus girth: `longest + 2 × (median + shortest)`.
    pub fn length_plus_girth(&self) -> Decimal {
        let girth = (self.median.saturating_add(self.shortest)).saturating_mul(Decimal::TWO);
        self.longest.saturating_add(girth)
    }

    /// The box volume, saturating at [`Decimal::MAX`] instead of overflowing.
    pub fn volume(&self) -> Decimal {
        self.longest
            .saturating_mul(self.median)
            .saturating_mul(self.shortest)
    }

    /// Applies `f` to every side, re-sorting afterwards.
    pub fn map(&self, f: impl Fn(Decimal) -> Decimal) -> Self {
        Self::sorted(f(self.longest), f(self.median), f(self.shortest))
    }
}

/// A validated catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalItem {
    /// The catalog key (e.g. an FNSKU).
    pub id: String,
    /// The package dimensions, already sorted.
    pub dimensions: Dimensions,
    /// The unit the dimensions are expressed in.
    pub dimension_unit: Unit,
    /// The actual package weight.
    pub weight: Decimal,
    /// The unit the weight is expressed in.
    pub weight_unit: Unit,
    /// The sale price, if known.
    pub price: Option<Decimal>,
    /// The marketplace/store code (e.g. "DE"), if known.
    pub marketplace: Option<String>,
}
