//! Market analysis: per-hour snapshots and the multi-hour trend engine.

pub mod ratio;
pub mod snapshot;
pub mod trends;

// Re-export commonly used items
pub use ratio::{DirectedPriceRange, SkipReason, ValidatedMarket, directed_price_range, validate_record};
pub use snapshot::{MarketSnapshot, ReferenceCurrencies, SpreadEntry, TriangularCandidate, VolumeStats};
pub use trends::{
    HistoricalComparisonEntry, MarketSeries, MarketStatistics, PersistentMarketEntry, SeriesPoint,
    TrendEngine, TrendingMarketEntry,
};
