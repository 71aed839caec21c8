//! Removal fee calculation.
//!
//! Removal fees follow a fixed schedule: a few weight steps per size class,
//! then a linear surcharge per unit of weight above the last step.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{RegimeRules, RemovalBands, RemovalSchedule};

/// Calculates the removal fee for a shipping weight.
///
/// Returns `None` for a weight of zero or less. Steps are inclusive at
/// their upper bound. The result is rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use fba_fee_engine::calculation::calculate_removal_fee;
/// use fba_fee_engine::config::RegimeRules;
/// use rust_decimal::Decimal;
///
/// let schedule = RegimeRules::us_2026().removal.unwrap();
/// // 2.89 + 1.06 × (3 − 2)
/// let fee = calculate_removal_fee(&schedule, true, Decimal::from(3));
/// assert_eq!(fee, Some(Decimal::new(395, 2)));
/// ```
pub fn calculate_removal_fee(schedule: &RemovalSchedule, standard_size: bool, weight: Decimal) -> Option<Decimal> {
    if weight <= Decimal::ZERO {
        return None;
    }
    let bands = if standard_size {
        &schedule.standard
    } else {
        &schedule.oversize
    };
    Some(banded_fee(bands, weight).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn banded_fee(bands: &RemovalBands, weight: Decimal) -> Decimal {
    if let Some(step) = bands.steps.iter().find(|step| weight <= step.up_to) {
        return step.fee;
    }
    let surcharge = &bands.surcharge;
    let excess = (weight - surcharge.threshold).max(Decimal::ZERO);
    surcharge
        .base
        .saturating_add(surcharge.per_unit.saturating_mul(excess))
}

/// Calculates the removal fee for a classified item, if the regime charges
/// one.
pub fn removal_fee_for(rules: &RegimeRules, size_category: &str, shipping_weight: Decimal) -> Option<Decimal> {
    let schedule = rules.removal.as_ref()?;
    let standard_size = rules.standard_categories.iter().any(|c| c == size_category);
    calculate_removal_fee(schedule, standard_size, shipping_weight)
}
