//! Analysis and computation configuration

/// Settings for the single-hour spread ranking
pub struct SpreadSettings {
    // Volume percentile floor applied when ranking spreads (None in the CLI disables it)
    pub min_liquidity_percentile: f64,
    // Number of ranked entries shown / sent per list
    pub top_n: usize,
}

/// Settings for triangular cycle detection
pub struct TriangularSettings {
    // Maximum candidates returned per hour
    pub max_results: usize,
}

/// Settings for persistent-spread detection across the trend window
pub struct PersistenceSettings {
    // Spread width (percent) an hour must show to count towards persistence
    pub min_spread_pct: f64,
    // Fraction of observed hours that must meet min_spread_pct
    pub threshold: f64,
    // Minimum normalized average volume (base currency equivalents)
    pub min_avg_volume: f64,
    pub top_n: usize,
}

/// Settings for widening-spread (trending) detection
pub struct TrendingSettings {
    // Regression window: most recent N observed hours per market
    pub lookback_hours: usize,
    // Minimum OLS slope (percent spread per observed hour) to report
    pub min_slope: f64,
    pub min_avg_volume: f64,
    pub top_n: usize,
}

/// Settings shared by the whole trend engine
pub struct TrendSettings {
    // Default number of historical hours pulled into the window
    pub window_hours: usize,
    // Current spread at or above this percentile of its own history is flagged unusual
    pub unusual_percentile: f64,
    pub comparison_top_n: usize,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    // Second reference currency for volume percentiles; the base currency
    // comes from the realm itself
    pub secondary_currency: &'static str,

    // Sub-groups
    pub spread: SpreadSettings,
    pub triangular: TriangularSettings,
    pub persistence: PersistenceSettings,
    pub trending: TrendingSettings,
    pub trend: TrendSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    secondary_currency: "divine",

    spread: SpreadSettings {
        min_liquidity_percentile: 10.0,
        top_n: 10,
    },

    triangular: TriangularSettings { max_results: 10 },

    persistence: PersistenceSettings {
        min_spread_pct: 2.0,
        threshold: 0.5,
        min_avg_volume: 100.0,
        top_n: 10,
    },

    trending: TrendingSettings {
        lookback_hours: 6,
        min_slope: 0.0,
        min_avg_volume: 100.0,
        top_n: 10,
    },

    trend: TrendSettings {
        window_hours: 24,
        unusual_percentile: 90.0,
        comparison_top_n: 10,
    },
};
