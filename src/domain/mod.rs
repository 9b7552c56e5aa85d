// Domain types and value objects
pub mod currency;
pub mod record;

// Re-export commonly used types
pub use currency::{CurrencyCode, DirectedPair, PairKey, Realm, split_market_id};
pub use record::{HourlyDigest, HourlyMarketRecord};
