// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod notify;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use analysis::{MarketSnapshot, ReferenceCurrencies, TrendEngine};
pub use domain::{HourlyDigest, HourlyMarketRecord, PairKey, Realm};
pub use notify::DiscordNotifier;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::ANALYSIS;
use crate::utils::{TimeUtils, utc_now_as_timestamp_sec};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// League whose markets to analyze
    #[arg(short, long, default_value = "Standard")]
    pub league: String,

    /// Game realm (decides the base currency and API path)
    #[arg(long, value_enum, default_value_t = Realm::Poe1)]
    pub realm: Realm,

    /// How many hours back the analyzed hour lies (the most recent hours
    /// may not be published yet)
    #[arg(long, default_value_t = 1)]
    pub hours_back: i64,

    /// Number of historical hours pulled into the trend window
    #[arg(long, default_value_t = ANALYSIS.trend.window_hours)]
    pub trend_hours: usize,

    /// Skip the multi-hour trend analysis entirely
    #[arg(long, default_value_t = false)]
    pub no_trend: bool,

    /// Entries shown per single-hour ranked list
    #[arg(long, default_value_t = ANALYSIS.spread.top_n)]
    pub top_n: usize,

    /// Volume percentile floor for the spread ranking
    #[arg(long, default_value_t = ANALYSIS.spread.min_liquidity_percentile)]
    pub min_liquidity: f64,

    /// Use API as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,

    /// Suppress Discord notifications for this run
    #[arg(long, default_value_t = false)]
    pub no_notify: bool,
}

/// Full screener run: current-hour snapshot analysis, then the multi-hour
/// trend pass, printing and notifying as it goes.
pub async fn run(args: &Cli) -> Result<()> {
    let client = data::authenticated_client()?;
    let sources = data::digest_sources(client, args.prefer_api);

    let current_hour = TimeUtils::truncate_to_hour(utc_now_as_timestamp_sec());
    let target_hour = current_hour - args.hours_back * TimeUtils::SEC_IN_HOUR;

    let notifier = if args.no_notify {
        DiscordNotifier::new(None)
    } else {
        DiscordNotifier::from_env()
    };

    // === Single-hour snapshot ===
    report::print_section("CURRENT HOUR SNAPSHOT ANALYSIS");
    log::info!("Analyzing league {:?} on realm {}", args.league, args.realm);

    let (digest, signature) = data::get_hourly_digest(&sources, args.realm, target_hour)
        .await
        .with_context(|| format!("Could not load markets for hour {}", target_hour))?;
    log::info!(
        "Loaded hour {} via {} ({} markets, next_change_id {:?})",
        target_hour,
        signature,
        digest.markets.len(),
        digest.next_change_id
    );
    if digest.is_empty() {
        anyhow::bail!("Hour {} came back with no markets at all", target_hour);
    }

    let base_currency = args.realm.base_currency();
    let refs = ReferenceCurrencies::new(base_currency, ANALYSIS.secondary_currency);
    let snapshot = MarketSnapshot::new(&args.league, target_hour, &digest.markets, refs.clone());
    if snapshot.is_empty() {
        anyhow::bail!(
            "No usable markets for league {:?} in hour {}",
            args.league,
            target_hour
        );
    }
    report::print_snapshot_overview(&snapshot);

    report::print_section("MARKET VOLUME STATISTICS");
    report::print_volume_stats(&snapshot, args.top_n);

    report::print_section("TOP SPREAD OPPORTUNITIES");
    let spreads = snapshot.spread_ranking(Some(args.min_liquidity));
    report::print_spread_ranking(&spreads, base_currency, args.top_n);

    report::print_section("TRIANGULAR INEFFICIENCIES");
    let triangular = snapshot.triangular_candidates(args.top_n.min(ANALYSIS.triangular.max_results));
    report::print_triangular_candidates(&triangular);

    let top_spreads = &spreads[..spreads.len().min(args.top_n)];
    notifier
        .send_spread_opportunities(top_spreads, &args.league, base_currency)
        .await;
    notifier
        .send_triangular_candidates(&triangular, &args.league, base_currency)
        .await;

    // === Multi-hour trend analysis ===
    if args.no_trend {
        return Ok(());
    }

    report::print_section("MULTI-HOUR TREND ANALYSIS");
    log::info!("Fetching {} hours of historical data...", args.trend_hours);
    let mut window =
        data::fetch_hour_window(&sources, args.realm, target_hour, args.trend_hours).await;
    window.push((target_hour, digest));

    if window.len() < 2 {
        log::warn!(
            "Insufficient data for trend analysis (need at least 2 hours, got {})",
            window.len()
        );
        return Ok(());
    }
    println!("\nLoaded {} hours of data", window.len());

    let hourly_records: Vec<(i64, Vec<HourlyMarketRecord>)> = window
        .into_iter()
        .map(|(ts, digest)| (ts, digest.markets))
        .collect();
    let engine = TrendEngine::build(&args.league, &refs, &hourly_records);

    report::print_section("PERSISTENT MARKETS");
    let mut persistent = engine.persistent_markets(
        ANALYSIS.persistence.min_spread_pct,
        ANALYSIS.persistence.threshold,
        ANALYSIS.persistence.min_avg_volume,
    );
    persistent.truncate(ANALYSIS.persistence.top_n);
    report::print_persistent_markets(&persistent, base_currency);

    report::print_section("TRENDING VOLATILITY");
    let mut trending = engine.trending_markets(
        ANALYSIS.trending.lookback_hours.min(engine.hours_analyzed()),
        ANALYSIS.trending.min_slope,
        ANALYSIS.trending.min_avg_volume,
    );
    trending.truncate(ANALYSIS.trending.top_n);
    report::print_trending_markets(&trending, base_currency);

    report::print_section("CURRENT HOUR vs HISTORICAL");
    let comparison = engine.historical_comparison(target_hour);
    report::print_historical_comparison(&comparison, ANALYSIS.trend.comparison_top_n);

    notifier
        .send_persistent_markets(&persistent, &args.league, base_currency, engine.hours_analyzed())
        .await;
    notifier
        .send_trending_markets(
            &trending,
            &args.league,
            base_currency,
            ANALYSIS.trending.lookback_hours,
        )
        .await;

    Ok(())
}
