//! Single-hour market processor: builds the deduplicated bidirectional
//! price-range table and the sorted volume index for one hourly digest, then
//! answers spread-ranking and triangular-path queries over that hour.
//! Instances are immutable once constructed.

use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use statrs::statistics::{Data, OrderStatistics, Statistics};
use strum::IntoEnumIterator;

use crate::analysis::ratio::{DirectedPriceRange, SkipReason, validate_record};
use crate::config::PRINT_SNAPSHOT_SKIPS;
use crate::domain::{CurrencyCode, DirectedPair, HourlyMarketRecord, PairKey};
use crate::utils::percentile_rank;

/// The two currencies every market's liquidity is measured against: the
/// economy's unit of account (chaos or exalted, per realm) and its high-value
/// store (divine).
#[derive(Debug, Clone)]
pub struct ReferenceCurrencies {
    pub base: CurrencyCode,
    pub secondary: CurrencyCode,
}

impl ReferenceCurrencies {
    pub fn new(base: &str, secondary: &str) -> Self {
        Self {
            base: base.to_string(),
            secondary: secondary.to_string(),
        }
    }
}

/// Sorted per-hour volume arrays, one per reference currency. Built once at
/// snapshot construction and never patched afterwards; percentile queries are
/// a binary search.
#[derive(Debug, Clone, Default)]
pub struct VolumeIndex {
    base_volumes: Vec<f64>,
    secondary_volumes: Vec<f64>,
}

impl VolumeIndex {
    fn build(volumes: &HashMap<PairKey, HashMap<CurrencyCode, f64>>, refs: &ReferenceCurrencies) -> Self {
        let collect_sorted = |currency: &str| {
            let mut observed: Vec<f64> = volumes
                .values()
                .filter_map(|v| v.get(currency).copied())
                .filter(|&v| v > 0.0)
                .collect();
            observed.sort_unstable_by(f64::total_cmp);
            observed
        };

        Self {
            base_volumes: collect_sorted(&refs.base),
            secondary_volumes: collect_sorted(&refs.secondary),
        }
    }

    pub fn base_percentile(&self, volume: f64) -> f64 {
        percentile_rank(&self.base_volumes, volume)
    }

    pub fn secondary_percentile(&self, volume: f64) -> f64 {
        percentile_rank(&self.secondary_volumes, volume)
    }
}

/// One row of the spread ranking. `min_price`/`max_price` price the pair's
/// lexically-first currency in units of the second.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadEntry {
    pub pair: PairKey,
    pub spread_pct: f64,
    pub liquidity_percentile: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub base_volume: f64,
    pub secondary_volume: f64,
}

/// Mean and median traded volume in one currency across the hour's markets
/// that actually traded it, plus the busiest of those markets. `top_markets`
/// is sorted by descending volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeStats {
    pub mean: f64,
    pub median: f64,
    pub top_markets: Vec<(PairKey, f64)>,
}

/// A three-leg cycle whose composed historical rates drift from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularCandidate {
    pub path: [CurrencyCode; 3],
    pub inefficiency_pct: f64,
    pub profit_multiplier: f64,
}

/// One hour's processed market set for a league. Owns its price-range arena
/// and volume index exclusively; read-only after construction.
pub struct MarketSnapshot {
    pub league: String,
    pub hour_timestamp: i64,
    refs: ReferenceCurrencies,
    /// Directed-range arena: both (a, b) and (b, a) per processed record.
    ranges: HashMap<DirectedPair, DirectedPriceRange>,
    /// Per unordered pair, the hour's traded volumes by currency.
    volumes: HashMap<PairKey, HashMap<CurrencyCode, f64>>,
    /// Distinct currencies seen, sorted for deterministic triple iteration.
    currencies: Vec<CurrencyCode>,
    volume_index: VolumeIndex,
    skip_counts: HashMap<SkipReason, usize>,
}

impl MarketSnapshot {
    pub fn new(
        league: &str,
        hour_timestamp: i64,
        records: &[HourlyMarketRecord],
        refs: ReferenceCurrencies,
    ) -> Self {
        let mut ranges = HashMap::new();
        let mut volumes = HashMap::new();
        let mut currency_set = BTreeSet::new();
        let mut skip_counts: HashMap<SkipReason, usize> = HashMap::new();
        // Each unordered pair is priced exactly once per hour; repeats in the
        // digest are dropped here rather than overwriting earlier data.
        let mut visited: HashSet<PairKey> = HashSet::new();

        for record in records {
            let market = match validate_record(record, league) {
                Ok(market) => market,
                Err(reason) => {
                    if PRINT_SNAPSHOT_SKIPS {
                        log::debug!("skipping {} ({})", record.market_id, reason);
                    }
                    *skip_counts.entry(reason).or_insert(0) += 1;
                    continue;
                }
            };

            if !visited.insert(market.pair.clone()) {
                continue;
            }

            currency_set.insert(market.pair.first.clone());
            currency_set.insert(market.pair.second.clone());
            ranges.insert(
                DirectedPair::new(&market.pair.first, &market.pair.second),
                market.forward,
            );
            ranges.insert(
                DirectedPair::new(&market.pair.second, &market.pair.first),
                market.reverse,
            );
            volumes.insert(market.pair, market.volume_traded);
        }

        let volume_index = VolumeIndex::build(&volumes, &refs);

        let snapshot = Self {
            league: league.to_string(),
            hour_timestamp,
            refs,
            ranges,
            volumes,
            currencies: currency_set.into_iter().collect(),
            volume_index,
            skip_counts,
        };
        snapshot.log_skip_summary(records.len());
        snapshot
    }

    fn log_skip_summary(&self, total_records: usize) {
        if log::log_enabled!(log::Level::Debug) {
            let summary = SkipReason::iter()
                .map(|reason| {
                    format!("{}={}", reason, self.skip_counts.get(&reason).copied().unwrap_or(0))
                })
                .join(" ");
            log::debug!(
                "snapshot {} @{}: {} records -> {} pairs ({})",
                self.league,
                self.hour_timestamp,
                total_records,
                self.volumes.len(),
                summary
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn league(&self) -> &str {
        &self.league
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    /// Every unordered pair this hour has a record for.
    pub fn pairs(&self) -> impl Iterator<Item = &PairKey> {
        self.volumes.keys()
    }

    pub fn reference_currencies(&self) -> &ReferenceCurrencies {
        &self.refs
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skip_counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn directed_range(&self, from: &str, to: &str) -> Option<&DirectedPriceRange> {
        self.ranges.get(&DirectedPair::new(from, to))
    }

    /// Spread for an unordered pair; identical in both directions since the
    /// stored ranges are reciprocal.
    pub fn spread_pct(&self, pair: &PairKey) -> Option<f64> {
        self.directed_range(&pair.first, &pair.second)
            .map(DirectedPriceRange::spread_pct)
    }

    pub fn pair_volume(&self, pair: &PairKey, currency: &str) -> f64 {
        self.volumes
            .get(pair)
            .and_then(|v| v.get(currency))
            .copied()
            .unwrap_or(0.0)
    }

    /// Percentile rank (0-100) of the pair's traded volume within this hour's
    /// sorted volume array for `reference`. 0 when `reference` is not one of
    /// the two reference currencies.
    pub fn volume_percentile(&self, pair: &PairKey, reference: &str) -> f64 {
        let volume = self.pair_volume(pair, reference);
        if reference == self.refs.base {
            self.volume_index.base_percentile(volume)
        } else if reference == self.refs.secondary {
            self.volume_index.secondary_percentile(volume)
        } else {
            0.0
        }
    }

    /// Overall liquidity standing for a pair: the better of its two
    /// reference-currency percentiles.
    pub fn liquidity_percentile(&self, pair: &PairKey) -> f64 {
        let base = self.volume_index.base_percentile(self.pair_volume(pair, &self.refs.base));
        let secondary = self
            .volume_index
            .secondary_percentile(self.pair_volume(pair, &self.refs.secondary));
        base.max(secondary)
    }

    /// The hour's midpoint rate for one secondary unit expressed in base
    /// units, if the reference pair traded this hour. Used for cross-currency
    /// volume normalization.
    pub fn secondary_to_base_rate(&self) -> Option<f64> {
        self.directed_range(&self.refs.secondary, &self.refs.base)
            .map(DirectedPriceRange::mid_price)
    }

    /// Volume statistics for `currency` over the hour, with the busiest
    /// `top_n` markets. Markets that traded none of `currency` are excluded;
    /// None when no market traded it at all. Volume ties break on lexical
    /// pair order for determinism.
    pub fn volume_stats(&self, currency: &str, top_n: usize) -> Option<VolumeStats> {
        let mut traded: Vec<(PairKey, f64)> = self
            .volumes
            .keys()
            .map(|pair| (pair.clone(), self.pair_volume(pair, currency)))
            .filter(|&(_, volume)| volume > 0.0)
            .collect();
        if traded.is_empty() {
            return None;
        }
        traded.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let volumes: Vec<f64> = traded.iter().map(|(_, volume)| *volume).collect();
        let mean = (&volumes).mean();
        let median = Data::new(volumes).median();
        traded.truncate(top_n);
        Some(VolumeStats {
            mean,
            median,
            top_markets: traded,
        })
    }

    /// Historical spread ranking for the hour, widest first. Ties break on
    /// higher liquidity percentile, then lexical pair order, for determinism.
    /// With `min_liquidity_percentile` set, pairs below the floor are dropped.
    pub fn spread_ranking(&self, min_liquidity_percentile: Option<f64>) -> Vec<SpreadEntry> {
        let mut entries: Vec<SpreadEntry> = self
            .volumes
            .keys()
            .filter_map(|pair| {
                let range = self.directed_range(&pair.first, &pair.second)?;
                let liquidity_percentile = self.liquidity_percentile(pair);
                if let Some(floor) = min_liquidity_percentile
                    && liquidity_percentile < floor
                {
                    return None;
                }
                Some(SpreadEntry {
                    pair: pair.clone(),
                    spread_pct: range.spread_pct(),
                    liquidity_percentile,
                    min_price: range.min_price,
                    max_price: range.max_price,
                    base_volume: self.pair_volume(pair, &self.refs.base),
                    secondary_volume: self.pair_volume(pair, &self.refs.secondary),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.spread_pct
                .total_cmp(&a.spread_pct)
                .then(b.liquidity_percentile.total_cmp(&a.liquidity_percentile))
                .then_with(|| a.pair.cmp(&b.pair))
        });
        entries
    }

    /// Three-leg cycles whose composed historical rates exceed 1, widest
    /// drift first, capped at `max_results`.
    ///
    /// Leg pricing is optimistic on entry (max_price for A→B and B→C) and
    /// conservative on the closing leg (min_price for C→A). NOTE: this is a
    /// modeling choice, not ground truth — the extreme prints feeding each
    /// leg likely never co-occurred within the hour.
    pub fn triangular_candidates(&self, max_results: usize) -> Vec<TriangularCandidate> {
        let mut candidates: Vec<TriangularCandidate> = self
            .currencies
            .iter()
            .permutations(3)
            .filter_map(|triple| {
                let (a, b, c) = (triple[0], triple[1], triple[2]);
                let leg_ab = self.directed_range(a, b)?;
                let leg_bc = self.directed_range(b, c)?;
                let leg_ca = self.directed_range(c, a)?;

                let profit_multiplier = leg_ab.max_price * leg_bc.max_price * leg_ca.min_price;
                let inefficiency_pct = (profit_multiplier - 1.0) * 100.0;
                if inefficiency_pct <= 0.0 {
                    return None;
                }

                Some(TriangularCandidate {
                    path: [a.clone(), b.clone(), c.clone()],
                    inefficiency_pct,
                    profit_multiplier,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.inefficiency_pct
                .total_cmp(&a.inefficiency_pct)
                .then_with(|| a.path.cmp(&b.path))
        });
        candidates.truncate(max_results);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAGUE: &str = "Standard";

    fn record(
        market_id: &str,
        low: &[(&str, f64)],
        high: &[(&str, f64)],
        volume: &[(&str, f64)],
    ) -> HourlyMarketRecord {
        let to_map = |entries: &[(&str, f64)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>()
        };
        HourlyMarketRecord {
            league: LEAGUE.to_string(),
            market_id: market_id.to_string(),
            lowest_ratio: to_map(low),
            highest_ratio: to_map(high),
            volume_traded: to_map(volume),
            ..Default::default()
        }
    }

    /// A market whose rates are exact (no spread): price(a→b) = rate.
    fn fixed_rate_record(a: &str, b: &str, rate: f64, volume: &[(&str, f64)]) -> HourlyMarketRecord {
        record(
            &format!("{}|{}", a, b),
            &[(a, rate), (b, 1.0)],
            &[(a, rate), (b, 1.0)],
            volume,
        )
    }

    fn refs() -> ReferenceCurrencies {
        ReferenceCurrencies::new("chaos", "divine")
    }

    fn snapshot(records: &[HourlyMarketRecord]) -> MarketSnapshot {
        MarketSnapshot::new(LEAGUE, 3_600, records, refs())
    }

    #[test]
    fn empty_hour_yields_empty_results() {
        let snap = snapshot(&[]);
        assert!(snap.is_empty());
        assert!(snap.spread_ranking(None).is_empty());
        assert!(snap.triangular_candidates(10).is_empty());
    }

    #[test]
    fn duplicate_pairs_are_processed_once() {
        let first = record(
            "chaos|divine",
            &[("chaos", 1.0), ("divine", 150.0)],
            &[("chaos", 1.0), ("divine", 160.0)],
            &[("chaos", 1_000.0)],
        );
        // Same unordered pair again, different numbers: must be ignored.
        let duplicate = record(
            "divine|chaos",
            &[("chaos", 1.0), ("divine", 10.0)],
            &[("chaos", 1.0), ("divine", 20.0)],
            &[("chaos", 9_999.0)],
        );

        let snap = snapshot(&[first, duplicate]);
        assert_eq!(snap.pair_count(), 1);
        let range = snap.directed_range("divine", "chaos").unwrap();
        assert!((range.min_price - 150.0).abs() < 1e-9);
        assert!((range.max_price - 160.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_records_are_counted_not_fatal() {
        let good = record(
            "chaos|divine",
            &[("chaos", 1.0), ("divine", 150.0)],
            &[("chaos", 1.0), ("divine", 160.0)],
            &[("chaos", 100.0)],
        );
        let mut wrong_league = good.clone();
        wrong_league.league = "Hardcore".to_string();
        let missing_ratio = record("chaos|alchemy", &[("chaos", 1.0)], &[("chaos", 1.0)], &[]);

        let snap = snapshot(&[good, wrong_league, missing_ratio]);
        assert_eq!(snap.pair_count(), 1);
        assert_eq!(snap.skipped(SkipReason::WrongLeague), 1);
        assert_eq!(snap.skipped(SkipReason::MissingRatio), 1);
    }

    #[test]
    fn spread_ranking_is_descending_with_liquidity_floor() {
        let wide = record(
            "chaos|divine",
            &[("chaos", 1.0), ("divine", 150.0)],
            &[("chaos", 1.0), ("divine", 180.0)], // 20% spread
            &[("chaos", 100.0)],
        );
        let narrow = record(
            "alchemy|chaos",
            &[("alchemy", 1.0), ("chaos", 4.0)],
            &[("alchemy", 1.0), ("chaos", 4.2)], // 5% spread
            &[("chaos", 5_000.0)],
        );
        let snap = snapshot(&[wide, narrow]);

        let ranking = snap.spread_ranking(None);
        assert_eq!(ranking.len(), 2);
        assert!(ranking[0].spread_pct > ranking[1].spread_pct);
        assert_eq!(ranking[0].pair, PairKey::new("chaos", "divine"));
        assert!((ranking[0].spread_pct - 20.0).abs() < 1e-9);

        // chaos|divine has the lower chaos volume, so a floor above its
        // percentile must remove it while keeping the liquid market.
        let chaos_divine = PairKey::new("chaos", "divine");
        let floor = snap.liquidity_percentile(&chaos_divine) + 1.0;
        let filtered = snap.spread_ranking(Some(floor));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pair, PairKey::new("alchemy", "chaos"));
        for entry in &filtered {
            assert!(entry.liquidity_percentile >= floor);
        }
    }

    #[test]
    fn volume_percentile_uses_binary_search_rank() {
        let records: Vec<HourlyMarketRecord> = [100.0_f64, 200.0, 300.0, 400.0]
            .iter()
            .enumerate()
            .map(|(i, &vol)| {
                fixed_rate_record("chaos", &format!("orb{}", i), 2.0, &[("chaos", vol)])
            })
            .collect();
        let snap = snapshot(&records);

        // 300 ranks above 2 of 4 observed volumes
        let pair = PairKey::new("chaos", "orb2");
        assert!((snap.volume_percentile(&pair, "chaos") - 50.0).abs() < 1e-9);
        // Unknown reference currency has no standing
        assert_eq!(snap.volume_percentile(&pair, "exalted"), 0.0);
    }

    #[test]
    fn volume_stats_cover_only_traded_markets() {
        let records = vec![
            fixed_rate_record("chaos", "alchemy", 4.0, &[("chaos", 100.0)]),
            fixed_rate_record("chaos", "fusing", 2.0, &[("chaos", 300.0), ("fusing", 600.0)]),
            fixed_rate_record("chaos", "divine", 150.0, &[("chaos", 200.0), ("divine", 5.0)]),
            // traded, but not in chaos
            fixed_rate_record("alchemy", "fusing", 2.0, &[("fusing", 50.0)]),
        ];
        let snap = snapshot(&records);

        // mean and median over {100, 200, 300}; the no-chaos market is out
        let stats = snap.volume_stats("chaos", 2).unwrap();
        assert!((stats.mean - 200.0).abs() < 1e-9);
        assert!((stats.median - 200.0).abs() < 1e-9);
        assert_eq!(stats.top_markets.len(), 2);
        assert_eq!(stats.top_markets[0].0, PairKey::new("chaos", "fusing"));
        assert!((stats.top_markets[0].1 - 300.0).abs() < 1e-9);
        assert_eq!(stats.top_markets[1].0, PairKey::new("chaos", "divine"));

        let divine = snap.volume_stats("divine", 5).unwrap();
        assert!((divine.mean - 5.0).abs() < 1e-9);
        assert_eq!(divine.top_markets.len(), 1);

        assert!(snap.volume_stats("exalted", 5).is_none());
    }

    #[test]
    fn volume_stats_median_of_even_count() {
        let records = vec![
            fixed_rate_record("chaos", "alchemy", 4.0, &[("chaos", 100.0)]),
            fixed_rate_record("chaos", "fusing", 2.0, &[("chaos", 400.0)]),
        ];
        let snap = snapshot(&records);

        let stats = snap.volume_stats("chaos", 10).unwrap();
        assert!((stats.mean - 250.0).abs() < 1e-9);
        assert!((stats.median - 250.0).abs() < 1e-9);
    }

    #[test]
    fn balanced_triangle_yields_no_candidate() {
        // 2 * 4 * 0.125 = 1.0, all exactly representable: no drift, no candidate.
        let records = vec![
            fixed_rate_record("a", "b", 2.0, &[("a", 1.0)]),
            fixed_rate_record("b", "c", 4.0, &[("b", 1.0)]),
            fixed_rate_record("c", "a", 0.125, &[("c", 1.0)]),
        ];
        let snap = snapshot(&records);
        assert!(snap.triangular_candidates(10).is_empty());
    }

    #[test]
    fn drifted_triangle_is_detected_and_capped() {
        // 2 * 3 * 0.25 = 1.5: a 50% historical round-trip drift.
        let records = vec![
            fixed_rate_record("a", "b", 2.0, &[("a", 1.0)]),
            fixed_rate_record("b", "c", 3.0, &[("b", 1.0)]),
            fixed_rate_record("c", "a", 0.25, &[("c", 1.0)]),
        ];
        let snap = snapshot(&records);

        let candidates = snap.triangular_candidates(10);
        assert!(!candidates.is_empty());
        let best = &candidates[0];
        assert!((best.inefficiency_pct - 50.0).abs() < 1e-9);
        assert!((best.profit_multiplier - 1.5).abs() < 1e-9);
        for candidate in &candidates {
            assert!(candidate.inefficiency_pct > 0.0);
        }

        assert_eq!(snap.triangular_candidates(1).len(), 1);
    }

    #[test]
    fn triangle_requires_all_three_legs() {
        let records = vec![
            fixed_rate_record("a", "b", 2.0, &[("a", 1.0)]),
            fixed_rate_record("b", "c", 3.0, &[("b", 1.0)]),
            // no c|a market
        ];
        let snap = snapshot(&records);
        assert!(snap.triangular_candidates(10).is_empty());
    }

    #[test]
    fn optimistic_entry_conservative_exit_policy() {
        // a→b trades between 2.0 and 2.5, b→c between 3.0 and 3.5, and the
        // closing c→a leg between 0.10 and 0.20. The estimate must use
        // 2.5 * 3.5 * 0.10 = 0.875 → no candidate, even though the
        // all-optimistic product (2.5 * 3.5 * 0.20 = 1.75) would qualify.
        let records = vec![
            record("a|b", &[("a", 2.0), ("b", 1.0)], &[("a", 2.5), ("b", 1.0)], &[]),
            record("b|c", &[("b", 3.0), ("c", 1.0)], &[("b", 3.5), ("c", 1.0)], &[]),
            record("c|a", &[("c", 0.10), ("a", 1.0)], &[("c", 0.20), ("a", 1.0)], &[]),
        ];
        let snap = snapshot(&records);

        let a_to_b_then_back: Vec<_> = snap
            .triangular_candidates(100)
            .into_iter()
            .filter(|cand| cand.path == ["a".to_string(), "b".to_string(), "c".to_string()])
            .collect();
        assert!(a_to_b_then_back.is_empty());
    }
}
