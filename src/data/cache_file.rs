//! On-disk digest cache, one JSON file per (realm, hour).
//!
//! Files use the same shape as the API payload so a cached hour and a fresh
//! hour are indistinguishable downstream.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{POE_API, PRINT_CACHE_EVENTS};
use crate::domain::{HourlyDigest, Realm};

pub fn digest_cache_path(realm: Realm, hour_timestamp: i64) -> PathBuf {
    let realm_suffix = match realm.api_segment() {
        Some(segment) => format!("_{}", segment),
        None => String::new(),
    };
    PathBuf::from(POE_API.cache_dir).join(format!(
        "currency_exchange_markets{}_{}.json",
        realm_suffix, hour_timestamp
    ))
}

pub fn load_digest(path: &Path) -> Result<HourlyDigest> {
    let file =
        File::open(path).with_context(|| format!("Failed to open cache file: {}", path.display()))?;
    let digest = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;
    if PRINT_CACHE_EVENTS {
        log::info!("cache hit: {}", path.display());
    }
    Ok(digest)
}

pub fn save_digest(path: &Path, digest: &HourlyDigest) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create cache file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), digest)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))?;
    if PRINT_CACHE_EVENTS {
        log::info!("cache write: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HourlyMarketRecord;

    #[test]
    fn cache_path_encodes_realm_and_hour() {
        assert_eq!(
            digest_cache_path(Realm::Poe1, 1_700_000_000),
            PathBuf::from("data_exports/currency_exchange_markets_1700000000.json")
        );
        assert_eq!(
            digest_cache_path(Realm::Poe2, 1_700_000_000),
            PathBuf::from("data_exports/currency_exchange_markets_poe2_1700000000.json")
        );
    }

    #[test]
    fn digest_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("orbscreen-cache-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("digest.json");

        let digest = HourlyDigest {
            next_change_id: Some("abc".to_string()),
            markets: vec![HourlyMarketRecord {
                league: "Standard".to_string(),
                market_id: "chaos|divine".to_string(),
                ..Default::default()
            }],
        };
        save_digest(&path, &digest).unwrap();
        let loaded = load_digest(&path).unwrap();
        assert_eq!(loaded.next_change_id.as_deref(), Some("abc"));
        assert_eq!(loaded.markets.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_fails_cleanly_on_missing_file() {
        let path = PathBuf::from("data_exports/definitely-not-there.json");
        assert!(load_digest(&path).is_err());
    }
}
