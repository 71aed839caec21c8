//! Multi-channel delivery fee lookup.

use tracing::warn;

use crate::models::{ChannelRateRow, DeliverySpeed, FeeLookup};

use super::fee_lookup::key_matches;
use super::{WeightCandidates, resolve_from_rows};

/// Resolves the multi-channel delivery fee for a size category and speed.
///
/// Uses the same range scan and weight fallback as fulfillment fees.
pub fn resolve_channel_fee(
    table: &[ChannelRateRow],
    speed: DeliverySpeed,
    size_category: &str,
    candidates: &WeightCandidates,
    placeholders: &[String],
) -> FeeLookup {
    let rows: Vec<(usize, &ChannelRateRow)> = table
        .iter()
        .enumerate()
        .filter(|(_, row)| speed.matches(&row.speed) && key_matches(&row.size_category, size_category))
        .collect();

    let lookup = resolve_from_rows(&rows, candidates, placeholders);
    if !lookup.is_resolved() {
        warn!(
            %speed,
            size_category,
            rows = rows.len(),
            shipping_weight = %candidates.shipping,
            "Multi-channel fee unresolved"
        );
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::us;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(speed: &str, category: &str, range: &str, fee: &str) -> ChannelRateRow {
        ChannelRateRow {
            speed: speed.to_string(),
            size_category: category.to_string(),
            weight_range: range.to_string(),
            fee: fee.to_string(),
        }
    }

    fn table() -> Vec<ChannelRateRow> {
        vec![
            row("标准", us::LARGE_STANDARD, "<=1磅", "$8.35"),
            row("标准", us::LARGE_STANDARD, "(1,20]磅", "8.35+0.38*(发货重量-1)"),
            row("加急", us::LARGE_STANDARD, "<=1磅", "$11.15"),
            row("加急", us::LARGE_STANDARD, "(1,20]磅", "11.15+0.50*(发货重量-1)"),
        ]
    }

    fn placeholders() -> Vec<String> {
        vec!["发货重量".to_string()]
    }

    #[test]
    fn test_speeds_select_their_rows() {
        let candidates = WeightCandidates::new(dec("3"), dec("2"), dec("3"));
        let standard = resolve_channel_fee(
            &table(),
            DeliverySpeed::Standard,
            us::LARGE_STANDARD,
            &candidates,
            &placeholders(),
        );
        let express = resolve_channel_fee(
            &table(),
            DeliverySpeed::Express,
            us::LARGE_STANDARD,
            &candidates,
            &placeholders(),
        );
        // 8.35 + 0.38 × 2 and 11.15 + 0.50 × 2
        assert_eq!(standard.fee, Some(dec("9.11")));
        assert_eq!(express.fee, Some(dec("12.15")));
    }

    #[test]
    fn test_channel_fee_falls_back_like_fulfillment() {
        let candidates = WeightCandidates::new(dec("25"), dec("0.8"), dec("25"));
        let lookup = resolve_channel_fee(
            &table(),
            DeliverySpeed::Standard,
            us::LARGE_STANDARD,
            &candidates,
            &placeholders(),
        );
        assert_eq!(lookup.fee, Some(dec("8.35")));
        assert_eq!(lookup.trace.attempts.len(), 2);
    }

    #[test]
    fn test_unknown_category_is_unresolved() {
        let candidates = WeightCandidates::new(dec("3"), dec("3"), dec("3"));
        let lookup = resolve_channel_fee(
            &table(),
            DeliverySpeed::Express,
            us::SMALL_BULKY,
            &candidates,
            &placeholders(),
        );
        assert_eq!(lookup.fee, None);
        assert_eq!(lookup.trace.rows_considered, 0);
    }
}
