//! Unit conversion.
//!
//! Catalog records declare their own units; regimes express thresholds in
//! one fixed unit per kind. Every conversion pivots through centimeters or
//! grams.

use rust_decimal::Decimal;

use crate::models::Unit;

/// Centimeters per inch.
pub const CM_PER_INCH: Decimal = Decimal::from_parts(254, 0, 0, false, 2);

/// Grams per pound.
pub const GRAMS_PER_POUND: Decimal = Decimal::from_parts(453592, 0, 0, false, 3);

/// Grams per kilogram.
pub const GRAMS_PER_KILOGRAM: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

fn base_factor(unit: Unit) -> Decimal {
    match unit {
        Unit::Centimeters | Unit::Grams => Decimal::ONE,
        Unit::Inches => CM_PER_INCH,
        Unit::Kilograms => GRAMS_PER_KILOGRAM,
        Unit::Pounds => GRAMS_PER_POUND,
    }
}

/// Converts `value` from one unit to another.
///
/// Returns the value unchanged when `from == to` or when the units are of
/// different kinds (a length cannot become a mass).
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::convert;
/// use fba_fee_engine::models::Unit;
/// use rust_decimal::Decimal;
///
/// let inches = convert(Decimal::new(254, 2), Unit::Centimeters, Unit::Inches);
/// assert_eq!(inches, Decimal::ONE);
/// ```
pub fn convert(value: Decimal, from: Unit, to: Unit) -> Decimal {
    if from == to || from.kind() != to.kind() {
        return value;
    }
    let base = value.saturating_mul(base_factor(from));
    base / base_factor(to)
}
