//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so normal
//! runs stay quiet.

/// Emit per-record skip details while building an hourly snapshot.
pub const PRINT_SNAPSHOT_SKIPS: bool = false;

/// If non-empty, emit detailed series-construction output only for this market.
/// Example: "chaos|divine". Use "" to disable.
pub const PRINT_SERIES_FOR_MARKET: &str = "";

/// Emit cache hit/miss diagnostics for the hourly digest cache.
pub const PRINT_CACHE_EVENTS: bool = false;

/// Emit the full webhook payload before it is sent.
pub const PRINT_DISCORD_PAYLOADS: bool = false;
