//! Configuration module for the orbscreen application.

pub mod analysis;
pub mod api;
pub mod notify;

mod debug; // Private so files reach flags through the re-exports below.
pub use debug::{
    PRINT_CACHE_EVENTS, PRINT_DISCORD_PAYLOADS, PRINT_SERIES_FOR_MARKET, PRINT_SNAPSHOT_SKIPS,
};

// Re-export commonly used items
pub use analysis::ANALYSIS;
pub use api::POE_API;
pub use notify::DISCORD;
