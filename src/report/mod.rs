//! Console rendering of analysis results. Everything here is presentation;
//! no list is filtered or re-sorted on the way out.

use crate::analysis::{
    HistoricalComparisonEntry, MarketSnapshot, PersistentMarketEntry, SpreadEntry,
    TrendingMarketEntry, TriangularCandidate,
};
use crate::config::ANALYSIS;
use crate::utils::epoch_sec_to_utc;

const RULE: &str = "================================================================================";

pub fn print_section(title: &str) {
    println!("\n{}", RULE);
    println!("{}", title);
    println!("{}", RULE);
}

pub fn print_snapshot_overview(snapshot: &MarketSnapshot) {
    println!(
        "\n{} markets across {} currencies (league: {}, hour: {} UTC)",
        snapshot.pair_count(),
        snapshot.currencies().len(),
        snapshot.league(),
        epoch_sec_to_utc(snapshot.hour_timestamp)
    );
}

/// Per-reference-currency volume statistics for the hour: mean/median over
/// the markets that traded the currency, then the busiest markets with each
/// side's traded volume.
pub fn print_volume_stats(snapshot: &MarketSnapshot, top_n: usize) {
    let refs = snapshot.reference_currencies();
    let mut printed_any = false;

    for currency in [&refs.base, &refs.secondary] {
        let Some(stats) = snapshot.volume_stats(currency, top_n) else {
            continue;
        };
        printed_any = true;

        println!("\n{} volume statistics:", currency);
        println!("   Mean: {:.2} {}", stats.mean, currency);
        println!("   Median: {:.2} {}", stats.median, currency);

        println!("\nTop {} markets by {} volume:", stats.top_markets.len(), currency);
        for (i, (pair, volume)) in stats.top_markets.iter().enumerate() {
            println!("\n{}. {}", i + 1, pair);
            println!("   {} volume: {:.0}", currency, volume);
            if let Some(other) = pair.other(currency) {
                let other_volume = snapshot.pair_volume(pair, other);
                if other_volume > 0.0 {
                    println!("   {} volume: {:.0}", other, other_volume);
                }
            }
        }
    }

    if !printed_any {
        println!("\nNo market volume data available.");
    }
}

pub fn print_spread_ranking(entries: &[SpreadEntry], base_currency: &str, top_n: usize) {
    if entries.is_empty() {
        println!("\nNo markets found with spreads meeting criteria.");
        return;
    }
    for (i, entry) in entries.iter().take(top_n).enumerate() {
        println!("\n{}. {}", i + 1, entry.pair);
        println!("   Spread Width: {:.2}%", entry.spread_pct);
        println!(
            "   Price Range: {:.4} to {:.4}",
            entry.min_price, entry.max_price
        );
        println!("   Liquidity: {:.0}th percentile", entry.liquidity_percentile);
        if entry.base_volume > 0.0 || entry.secondary_volume > 0.0 {
            let mut parts = Vec::new();
            if entry.base_volume > 0.0 {
                parts.push(format!("{:.0} {}", entry.base_volume, base_currency));
            }
            if entry.secondary_volume > 0.0 {
                parts.push(format!(
                    "{:.0} {}",
                    entry.secondary_volume,
                    ANALYSIS.secondary_currency
                ));
            }
            println!("   Volume: {}", parts.join(" | "));
        }
    }
}

pub fn print_triangular_candidates(candidates: &[TriangularCandidate]) {
    if candidates.is_empty() {
        println!("\nNo triangular inefficiencies found.");
        return;
    }
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "\n{}. {} -> {} -> {} -> {}",
            i + 1,
            c.path[0],
            c.path[1],
            c.path[2],
            c.path[0]
        );
        println!(
            "   Return: {:.2}% (multiplier {:.4})",
            c.inefficiency_pct, c.profit_multiplier
        );
    }
}

pub fn print_persistent_markets(entries: &[PersistentMarketEntry], base_currency: &str) {
    if entries.is_empty() {
        println!("\nNo persistent markets found.");
        return;
    }
    for (i, m) in entries.iter().enumerate() {
        println!("\n{}. {}", i + 1, m.pair);
        println!(
            "   Persistence: {:.0}% ({}/{} hours)",
            m.persistence_ratio * 100.0,
            m.hours_with_spread,
            m.observed_hours
        );
        println!(
            "   Avg Spread: {:.2}% (latest {:.2}%)",
            m.avg_spread, m.latest_spread
        );
        println!(
            "   Avg Volume: {:.0} {}/hr | Volume Consistency: {:.0}%",
            m.avg_volume,
            base_currency,
            m.volume_consistency * 100.0
        );
    }
}

pub fn print_trending_markets(entries: &[TrendingMarketEntry], base_currency: &str) {
    if entries.is_empty() {
        println!("\nNo markets with widening spreads found.");
        return;
    }
    for (i, m) in entries.iter().enumerate() {
        println!("\n{}. {}", i + 1, m.pair);
        println!(
            "   Current: {:.2}% | Recent Avg: {:.2}% | Change: {:+.2}%",
            m.current_spread, m.avg_recent_spread, m.spread_change
        );
        println!(
            "   Trend: {:+.4}%/hr over {} points",
            m.slope, m.points_used
        );
        println!("   Avg Volume: {:.0} {}/hr", m.avg_volume, base_currency);
    }
}

pub fn print_historical_comparison(entries: &[HistoricalComparisonEntry], top_n: usize) {
    if entries.is_empty() {
        println!("\nNo current opportunities with historical data.");
        return;
    }
    for (i, e) in entries.iter().take(top_n).enumerate() {
        let marker = if e.unusual { " [UNUSUAL]" } else { "" };
        println!("\n{}. {}{}", i + 1, e.pair, marker);
        println!(
            "   Current: {:.2}% at the {:.0}th percentile of {} tracked hours",
            e.current_spread, e.percentile, e.hours_tracked
        );
        println!(
            "   Historical: avg {:.2}% / max {:.2}%",
            e.historical_avg, e.historical_max
        );
    }
}
