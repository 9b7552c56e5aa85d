//! Validation boundary between raw digest records and the typed entities the
//! analyzers work with. All map lookups on raw records happen here; anything
//! past this point is fully typed and known-good.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CurrencyCode, HourlyMarketRecord, PairKey, split_market_id};

/// Historical price bounds for an ordered pair (from → to): how many units of
/// `to` one unit of `from` exchanged for during the hour, bracketed over
/// every trade the digest aggregates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DirectedPriceRange {
    pub min_price: f64,
    pub max_price: f64,
}

impl DirectedPriceRange {
    /// Relative gap between the historical high and low, in percent.
    pub fn spread_pct(&self) -> f64 {
        (self.max_price - self.min_price) / self.min_price * 100.0
    }

    /// Midpoint of the bounds; used as the hour's representative rate when
    /// normalizing volumes across reference currencies.
    pub fn mid_price(&self) -> f64 {
        (self.min_price + self.max_price) / 2.0
    }
}

/// Why a raw record was excluded from an hour's snapshot. Skips are counted
/// and logged, never raised: one bad record must not abort the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    WrongLeague,
    InvalidMarketId,
    MissingRatio,
    NonPositiveRatio,
}

/// A digest record that passed validation: both directed price ranges plus
/// the hour's traded volumes, keyed by the pair's currencies.
///
/// `forward` prices `pair.first` in units of `pair.second`; `reverse` is the
/// opposite direction. Storing both means triangular composition never needs
/// a runtime inversion.
#[derive(Debug, Clone)]
pub struct ValidatedMarket {
    pub pair: PairKey,
    pub forward: DirectedPriceRange,
    pub reverse: DirectedPriceRange,
    pub volume_traded: HashMap<CurrencyCode, f64>,
}

/// Derive the (from → to) price range from an hour's low/high ratio maps.
/// One unit of `from` is worth `ratio[from] / ratio[to]` units of `to`.
///
/// The digest reports the lowest and highest exchange ratios seen during the
/// hour, per currency. A single low/low or high/high divide is not a valid
/// bound: a high-`from`/low-`to` print can land outside the bracket a
/// low-`from`/high-`to` print implies. So all four
/// {lowest,highest}×{lowest,highest} combinations are computed and the
/// overall min/max taken.
///
/// Returns None when either currency is absent from either map or any ratio
/// is non-positive; the caller skips the pair for that hour.
pub fn directed_price_range(
    lowest_ratio: &HashMap<CurrencyCode, f64>,
    highest_ratio: &HashMap<CurrencyCode, f64>,
    from: &str,
    to: &str,
) -> Option<DirectedPriceRange> {
    let from_ratios = [*lowest_ratio.get(from)?, *highest_ratio.get(from)?];
    let to_ratios = [*lowest_ratio.get(to)?, *highest_ratio.get(to)?];

    if from_ratios.iter().any(|&r| r <= 0.0) || to_ratios.iter().any(|&r| r <= 0.0) {
        return None;
    }

    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    for &f in &from_ratios {
        for &t in &to_ratios {
            let price = f / t;
            min_price = min_price.min(price);
            max_price = max_price.max(price);
        }
    }

    Some(DirectedPriceRange {
        min_price,
        max_price,
    })
}

/// The single choke point turning a raw record into a typed market entity.
pub fn validate_record(
    record: &HourlyMarketRecord,
    league: &str,
) -> Result<ValidatedMarket, SkipReason> {
    if record.league != league {
        return Err(SkipReason::WrongLeague);
    }

    let (currency_a, currency_b) =
        split_market_id(&record.market_id).ok_or(SkipReason::InvalidMarketId)?;

    for map in [&record.lowest_ratio, &record.highest_ratio] {
        if !map.contains_key(currency_a) || !map.contains_key(currency_b) {
            return Err(SkipReason::MissingRatio);
        }
    }

    let pair = PairKey::new(currency_a, currency_b);
    let forward = directed_price_range(
        &record.lowest_ratio,
        &record.highest_ratio,
        &pair.first,
        &pair.second,
    )
    .ok_or(SkipReason::NonPositiveRatio)?;
    let reverse = directed_price_range(
        &record.lowest_ratio,
        &record.highest_ratio,
        &pair.second,
        &pair.first,
    )
    .ok_or(SkipReason::NonPositiveRatio)?;

    Ok(ValidatedMarket {
        pair,
        forward,
        reverse,
        volume_traded: record.volume_traded.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ratio_maps(
        low: &[(&str, f64)],
        high: &[(&str, f64)],
    ) -> (HashMap<String, f64>, HashMap<String, f64>) {
        let to_map = |entries: &[(&str, f64)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>()
        };
        (to_map(low), to_map(high))
    }

    #[test]
    fn chaos_divine_scenario() {
        // lowest_ratio={chaos:1, divine:150}, highest_ratio={chaos:1, divine:160}
        // must bracket to price(chaos→divine) = [1/160, 1/150] and
        // price(divine→chaos) = [150, 160].
        let (low, high) = ratio_maps(&[("chaos", 1.0), ("divine", 150.0)], &[
            ("chaos", 1.0),
            ("divine", 160.0),
        ]);

        let chaos_in_divine = directed_price_range(&low, &high, "chaos", "divine").unwrap();
        assert!(approx_eq(chaos_in_divine.min_price, 1.0 / 160.0));
        assert!(approx_eq(chaos_in_divine.max_price, 1.0 / 150.0));

        let divine_in_chaos = directed_price_range(&low, &high, "divine", "chaos").unwrap();
        assert!(approx_eq(divine_in_chaos.min_price, 150.0));
        assert!(approx_eq(divine_in_chaos.max_price, 160.0));

        // spread for divine priced in chaos: (160-150)/150 * 100 ≈ 6.67%
        assert!((divine_in_chaos.spread_pct() - 100.0 * 10.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn reciprocal_symmetry() {
        let (low, high) = ratio_maps(&[("a", 2.0), ("b", 7.0)], &[("a", 3.0), ("b", 11.0)]);

        let ab = directed_price_range(&low, &high, "a", "b").unwrap();
        let ba = directed_price_range(&low, &high, "b", "a").unwrap();

        assert!(approx_eq(ab.min_price, 1.0 / ba.max_price));
        assert!(approx_eq(ab.max_price, 1.0 / ba.min_price));
        assert!(ab.min_price <= ab.max_price);
        assert!(ba.min_price <= ba.max_price);
    }

    #[test]
    fn all_four_combinations_are_bracketed() {
        // a→b combinations are {2,3}/{7,11}; the bracket is [2/11, 3/7],
        // which a naive lowest/lowest divide (2/7) would miss entirely.
        let (low, high) = ratio_maps(&[("a", 2.0), ("b", 7.0)], &[("a", 3.0), ("b", 11.0)]);
        let range = directed_price_range(&low, &high, "a", "b").unwrap();
        assert!(approx_eq(range.min_price, 2.0 / 11.0));
        assert!(approx_eq(range.max_price, 3.0 / 7.0));
    }

    #[test]
    fn missing_or_zero_ratios_yield_none() {
        let (low, high) = ratio_maps(&[("a", 1.0)], &[("a", 1.0), ("b", 5.0)]);
        assert!(directed_price_range(&low, &high, "a", "b").is_none());

        let (low, high) = ratio_maps(&[("a", 0.0), ("b", 5.0)], &[("a", 1.0), ("b", 6.0)]);
        assert!(directed_price_range(&low, &high, "a", "b").is_none());
    }

    #[test]
    fn validation_skip_reasons() {
        let mut record = HourlyMarketRecord {
            league: "Standard".to_string(),
            market_id: "chaos|divine".to_string(),
            ..Default::default()
        };

        assert_eq!(
            validate_record(&record, "Settlers").unwrap_err(),
            SkipReason::WrongLeague
        );
        assert_eq!(
            validate_record(&record, "Standard").unwrap_err(),
            SkipReason::MissingRatio
        );

        record.market_id = "chaosdivine".to_string();
        assert_eq!(
            validate_record(&record, "Standard").unwrap_err(),
            SkipReason::InvalidMarketId
        );

        record.market_id = "chaos|divine".to_string();
        record.lowest_ratio = [("chaos".to_string(), 0.0), ("divine".to_string(), 150.0)]
            .into_iter()
            .collect();
        record.highest_ratio = [("chaos".to_string(), 1.0), ("divine".to_string(), 160.0)]
            .into_iter()
            .collect();
        assert_eq!(
            validate_record(&record, "Standard").unwrap_err(),
            SkipReason::NonPositiveRatio
        );
    }

    #[test]
    fn validation_produces_both_directions() {
        let record = HourlyMarketRecord {
            league: "Standard".to_string(),
            market_id: "chaos|divine".to_string(),
            lowest_ratio: [("chaos".to_string(), 1.0), ("divine".to_string(), 150.0)]
                .into_iter()
                .collect(),
            highest_ratio: [("chaos".to_string(), 1.0), ("divine".to_string(), 160.0)]
                .into_iter()
                .collect(),
            volume_traded: [("chaos".to_string(), 4_500.0), ("divine".to_string(), 30.0)]
                .into_iter()
                .collect(),
            ..Default::default()
        };

        let market = validate_record(&record, "Standard").unwrap();
        assert_eq!(market.pair, PairKey::new("chaos", "divine"));
        // pair.first = "chaos", so forward prices chaos in divine
        assert!(approx_eq(market.forward.max_price, 1.0 / 150.0));
        assert!(approx_eq(market.reverse.min_price, 150.0));
    }
}
