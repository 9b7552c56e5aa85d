//! Multi-hour trend engine: persistence ratios, regression-based trend
//! detection and current-vs-history comparison over an ordered window of
//! hourly snapshots. Holds shared read-only references to the snapshots it
//! was given and never mutates them.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::analysis::snapshot::{MarketSnapshot, ReferenceCurrencies};
use crate::config::{ANALYSIS, PRINT_SERIES_FOR_MARKET};
use crate::domain::{HourlyMarketRecord, PairKey};
use crate::utils::{get_max, get_min, ols_slope, percentile_rank};

/// One observed hour for one market. Hours where the market had no record
/// produce no point at all: gaps are gaps, never zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    /// Position of the hour within the engine's window (not the position
    /// within this market's observed points).
    pub hour_index: usize,
    pub timestamp: i64,
    pub spread_pct: f64,
    pub base_volume: f64,
    pub secondary_volume: f64,
    /// Volume normalized to base-currency units via the hour's own
    /// secondary→base midpoint rate. None when the secondary volume could
    /// not be converted that hour; such hours are excluded from volume
    /// averages rather than counted as zero.
    pub volume_in_base: Option<f64>,
}

/// Ordered-by-hour observations for one market across the window.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    pub pair: PairKey,
    pub points: Vec<SeriesPoint>,
}

impl MarketSeries {
    pub fn observed_hours(&self) -> usize {
        self.points.len()
    }

    fn spreads(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.spread_pct).collect()
    }

    /// Mean normalized volume over the hours where normalization was
    /// possible; zero-volume hours count, unconvertible hours don't.
    fn avg_volume_in_base(&self) -> f64 {
        let convertible: Vec<f64> = self.points.iter().filter_map(|p| p.volume_in_base).collect();
        if convertible.is_empty() {
            0.0
        } else {
            convertible.iter().sum::<f64>() / convertible.len() as f64
        }
    }

    fn total_volume_in_base(&self) -> f64 {
        self.points.iter().filter_map(|p| p.volume_in_base).sum()
    }

    fn hours_with_volume(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.base_volume > 0.0 || p.secondary_volume > 0.0)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistentMarketEntry {
    pub pair: PairKey,
    pub persistence_ratio: f64,
    pub hours_with_spread: usize,
    pub observed_hours: usize,
    pub avg_spread: f64,
    pub avg_volume: f64,
    pub volume_consistency: f64,
    pub latest_spread: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendingMarketEntry {
    pub pair: PairKey,
    pub slope: f64,
    pub current_spread: f64,
    pub avg_recent_spread: f64,
    pub spread_change: f64,
    pub points_used: usize,
    pub avg_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalComparisonEntry {
    pub pair: PairKey,
    pub current_spread: f64,
    pub percentile: f64,
    pub historical_avg: f64,
    pub historical_max: f64,
    pub hours_tracked: usize,
    pub unusual: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketStatistics {
    pub pair: PairKey,
    pub observed_hours: usize,
    pub mean_spread: f64,
    pub median_spread: f64,
    /// Population standard deviation; None below 2 observed hours rather
    /// than a misleading zero.
    pub std_dev_spread: Option<f64>,
    pub min_spread: f64,
    pub max_spread: f64,
    pub avg_volume: f64,
    pub total_volume: f64,
    pub volume_consistency: f64,
}

struct HourFrame {
    timestamp: i64,
    snapshot: Arc<MarketSnapshot>,
}

/// Trend engine over an ordered window of hourly snapshots, most-recent
/// last. Per-market series are built lazily on first query and memoised
/// behind a mutexed map; everything else is read-only.
pub struct TrendEngine {
    hours: Vec<HourFrame>,
    series_cache: Mutex<HashMap<PairKey, Arc<MarketSeries>>>,
}

impl TrendEngine {
    pub fn new(hours: Vec<(i64, Arc<MarketSnapshot>)>) -> Self {
        Self {
            hours: hours
                .into_iter()
                .map(|(timestamp, snapshot)| HourFrame { timestamp, snapshot })
                .collect(),
            series_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Construct snapshots for every hour and assemble the engine. Hours are
    /// independent, so construction is parallelized across them; the ordered
    /// result collection preserves the input (oldest-first) order.
    pub fn build(
        league: &str,
        refs: &ReferenceCurrencies,
        hourly_records: &[(i64, Vec<HourlyMarketRecord>)],
    ) -> Self {
        let snapshots: Vec<(i64, Arc<MarketSnapshot>)> = hourly_records
            .par_iter()
            .map(|(timestamp, records)| {
                (
                    *timestamp,
                    Arc::new(MarketSnapshot::new(league, *timestamp, records, refs.clone())),
                )
            })
            .collect();
        Self::new(snapshots)
    }

    pub fn hours_analyzed(&self) -> usize {
        self.hours.len()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = (i64, &Arc<MarketSnapshot>)> {
        self.hours.iter().map(|h| (h.timestamp, &h.snapshot))
    }

    /// Every market observed in at least one hour of the window, in
    /// deterministic order.
    pub fn observed_pairs(&self) -> Vec<PairKey> {
        let mut pairs = BTreeSet::new();
        for frame in &self.hours {
            pairs.extend(frame.snapshot.pairs().cloned());
        }
        pairs.into_iter().collect()
    }

    /// Lazily built, memoised per-market series (the cache is shared across
    /// queries; snapshots themselves are never touched again).
    pub fn series_for(&self, pair: &PairKey) -> Arc<MarketSeries> {
        if let Ok(cache) = self.series_cache.lock()
            && let Some(series) = cache.get(pair)
        {
            return Arc::clone(series);
        }

        let series = Arc::new(self.build_series(pair));
        if let Ok(mut cache) = self.series_cache.lock() {
            cache.insert(pair.clone(), Arc::clone(&series));
        }
        series
    }

    fn build_series(&self, pair: &PairKey) -> MarketSeries {
        let mut points = Vec::new();
        for (hour_index, frame) in self.hours.iter().enumerate() {
            let Some(spread_pct) = frame.snapshot.spread_pct(pair) else {
                continue; // gap, not a zero
            };
            let refs = frame.snapshot.reference_currencies();
            let base_volume = frame.snapshot.pair_volume(pair, &refs.base);
            let secondary_volume = frame.snapshot.pair_volume(pair, &refs.secondary);

            // Secondary volume converts at this hour's own midpoint rate; if
            // the reference pair didn't trade this hour, the conversion is
            // impossible and the hour drops out of volume averages.
            let volume_in_base = if secondary_volume > 0.0 {
                frame
                    .snapshot
                    .secondary_to_base_rate()
                    .map(|rate| base_volume.max(secondary_volume * rate))
            } else {
                Some(base_volume)
            };

            points.push(SeriesPoint {
                hour_index,
                timestamp: frame.timestamp,
                spread_pct,
                base_volume,
                secondary_volume,
                volume_in_base,
            });
        }
        if !PRINT_SERIES_FOR_MARKET.is_empty() && pair.market_id() == PRINT_SERIES_FOR_MARKET {
            log::info!(
                "series {}: {} points over {} hours",
                pair,
                points.len(),
                self.hours.len()
            );
            for p in &points {
                log::info!(
                    "  hour {} @{}: spread {:.2}% volume {:?}",
                    p.hour_index,
                    p.timestamp,
                    p.spread_pct,
                    p.volume_in_base
                );
            }
        }
        MarketSeries {
            pair: pair.clone(),
            points,
        }
    }

    /// Markets whose spread stayed at or above `min_spread_pct` in at least
    /// `persistence_threshold` of their observed hours, with enough average
    /// normalized volume. Sorted by persistence ratio, then average spread.
    pub fn persistent_markets(
        &self,
        min_spread_pct: f64,
        persistence_threshold: f64,
        min_avg_volume: f64,
    ) -> Vec<PersistentMarketEntry> {
        let mut entries: Vec<PersistentMarketEntry> = self
            .observed_pairs()
            .into_iter()
            .filter_map(|pair| {
                let series = self.series_for(&pair);
                let observed_hours = series.observed_hours();
                if observed_hours == 0 {
                    return None;
                }

                let hours_with_spread = series
                    .points
                    .iter()
                    .filter(|p| p.spread_pct >= min_spread_pct)
                    .count();
                let persistence_ratio = hours_with_spread as f64 / observed_hours as f64;
                if persistence_ratio < persistence_threshold {
                    return None;
                }

                let avg_volume = series.avg_volume_in_base();
                if avg_volume < min_avg_volume {
                    return None;
                }

                let spreads = series.spreads();
                Some(PersistentMarketEntry {
                    pair,
                    persistence_ratio,
                    hours_with_spread,
                    observed_hours,
                    avg_spread: (&spreads).mean(),
                    avg_volume,
                    volume_consistency: series.hours_with_volume() as f64 / observed_hours as f64,
                    latest_spread: spreads[spreads.len() - 1],
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.persistence_ratio
                .total_cmp(&a.persistence_ratio)
                .then(b.avg_spread.total_cmp(&a.avg_spread))
                .then_with(|| a.pair.cmp(&b.pair))
        });
        entries
    }

    /// Markets whose spread is widening over their most recent
    /// `lookback_hours` observed points. The regression x-axis is the
    /// position among observed points, not the wall-clock hour, so gaps
    /// don't distort the slope. Markets with fewer than 2 points in the
    /// window are excluded (slope undefined).
    pub fn trending_markets(
        &self,
        lookback_hours: usize,
        min_slope: f64,
        min_avg_volume: f64,
    ) -> Vec<TrendingMarketEntry> {
        let mut entries: Vec<TrendingMarketEntry> = self
            .observed_pairs()
            .into_iter()
            .filter_map(|pair| {
                let series = self.series_for(&pair);
                let start = series.points.len().saturating_sub(lookback_hours);
                let window = &series.points[start..];
                let recent_spreads: Vec<f64> = window.iter().map(|p| p.spread_pct).collect();
                let slope = ols_slope(&recent_spreads)?;
                if slope < min_slope {
                    return None;
                }

                let convertible: Vec<f64> =
                    window.iter().filter_map(|p| p.volume_in_base).collect();
                let avg_volume = if convertible.is_empty() {
                    0.0
                } else {
                    convertible.iter().sum::<f64>() / convertible.len() as f64
                };
                if avg_volume < min_avg_volume {
                    return None;
                }

                Some(TrendingMarketEntry {
                    pair,
                    slope,
                    current_spread: recent_spreads[recent_spreads.len() - 1],
                    avg_recent_spread: (&recent_spreads).mean(),
                    spread_change: recent_spreads[recent_spreads.len() - 1] - recent_spreads[0],
                    points_used: recent_spreads.len(),
                    avg_volume,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.slope
                .total_cmp(&a.slope)
                .then_with(|| a.pair.cmp(&b.pair))
        });
        entries
    }

    /// Rank every market's current-hour spread against its own history
    /// (all prior observed hours), highest percentile first. `current_hour`
    /// must match one of the window's hour timestamps; otherwise there is
    /// nothing to compare and the result is empty.
    pub fn historical_comparison(&self, current_hour: i64) -> Vec<HistoricalComparisonEntry> {
        let Some(current_index) = self.hours.iter().position(|h| h.timestamp == current_hour)
        else {
            return Vec::new();
        };

        let mut entries: Vec<HistoricalComparisonEntry> = self
            .observed_pairs()
            .into_iter()
            .filter_map(|pair| {
                let series = self.series_for(&pair);
                let current = series
                    .points
                    .iter()
                    .find(|p| p.hour_index == current_index)?;
                let mut prior_spreads: Vec<f64> = series
                    .points
                    .iter()
                    .filter(|p| p.hour_index < current_index)
                    .map(|p| p.spread_pct)
                    .collect();
                if prior_spreads.is_empty() {
                    return None;
                }
                prior_spreads.sort_unstable_by(f64::total_cmp);

                let percentile = percentile_rank(&prior_spreads, current.spread_pct);
                Some(HistoricalComparisonEntry {
                    pair,
                    current_spread: current.spread_pct,
                    percentile,
                    historical_avg: (&prior_spreads).mean(),
                    historical_max: get_max(&prior_spreads),
                    hours_tracked: prior_spreads.len(),
                    unusual: percentile >= ANALYSIS.trend.unusual_percentile,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.percentile
                .total_cmp(&a.percentile)
                .then_with(|| a.pair.cmp(&b.pair))
        });
        entries
    }

    /// Aggregate spread and volume statistics for one market across all its
    /// observed hours. None when the market was never observed.
    pub fn market_statistics(&self, pair: &PairKey) -> Option<MarketStatistics> {
        let series = self.series_for(pair);
        let observed_hours = series.observed_hours();
        if observed_hours == 0 {
            return None;
        }

        let spreads = series.spreads();
        let std_dev_spread = if observed_hours >= 2 {
            Some((&spreads).population_std_dev())
        } else {
            None
        };

        Some(MarketStatistics {
            pair: pair.clone(),
            observed_hours,
            mean_spread: (&spreads).mean(),
            median_spread: Data::new(spreads.clone()).median(),
            std_dev_spread,
            min_spread: get_min(&spreads),
            max_spread: get_max(&spreads),
            avg_volume: series.avg_volume_in_base(),
            total_volume: series.total_volume_in_base(),
            volume_consistency: series.hours_with_volume() as f64 / observed_hours as f64,
        })
    }
}
