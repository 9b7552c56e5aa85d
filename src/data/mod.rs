//! Hourly digest acquisition: disk cache and authenticated API, tried in
//! order behind a common trait.

pub mod api_client;
pub mod auth;
pub mod cache_file;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::POE_API;
use crate::domain::{HourlyDigest, Realm};
use crate::utils::TimeUtils;
use api_client::PoeApiClient;

#[async_trait]
pub trait HourlyDataSource {
    // Either produce the hour's digest OR return an anyhow::error
    async fn fetch_hour(&self, realm: Realm, hour_timestamp: i64) -> Result<HourlyDigest>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Disk cache of previously fetched hours.
pub struct CacheSource;

#[async_trait]
impl HourlyDataSource for CacheSource {
    fn signature(&self) -> &'static str {
        "disk cache"
    }

    async fn fetch_hour(&self, realm: Realm, hour_timestamp: i64) -> Result<HourlyDigest> {
        cache_file::load_digest(&cache_file::digest_cache_path(realm, hour_timestamp))
    }
}

/// Live API with write-through caching: every successful fetch lands on disk
/// so the next run can serve it locally.
pub struct ApiSource {
    client: Arc<PoeApiClient>,
}

impl ApiSource {
    pub fn new(client: Arc<PoeApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HourlyDataSource for ApiSource {
    fn signature(&self) -> &'static str {
        "exchange API"
    }

    async fn fetch_hour(&self, realm: Realm, hour_timestamp: i64) -> Result<HourlyDigest> {
        let digest = self.client.fetch_markets(realm, hour_timestamp).await?;
        let path = cache_file::digest_cache_path(realm, hour_timestamp);
        if let Err(e) = cache_file::save_digest(&path, &digest) {
            log::warn!("Could not cache digest to {}: {:#}", path.display(), e);
        }
        Ok(digest)
    }
}

/// Build the ordered source chain. Cache first by default; `prefer_api`
/// flips the order but keeps the cache as fallback.
pub fn digest_sources(
    client: Arc<PoeApiClient>,
    prefer_api: bool,
) -> Vec<Box<dyn HourlyDataSource>> {
    if prefer_api {
        vec![Box::new(ApiSource::new(client)), Box::new(CacheSource)]
    } else {
        vec![Box::new(CacheSource), Box::new(ApiSource::new(client))]
    }
}

pub async fn get_hourly_digest(
    sources: &[Box<dyn HourlyDataSource>],
    realm: Realm,
    hour_timestamp: i64,
) -> Result<(HourlyDigest, &'static str)> {
    for source in sources {
        match source.fetch_hour(realm, hour_timestamp).await {
            Ok(digest) => {
                let signature = source.signature();
                return Ok((digest, signature));
            }
            Err(e) => {
                log::info!("Source failed for hour {}: {:#}", hour_timestamp, e);
                // Continue to the next source
            }
        }
    }
    Err(anyhow!("All sources failed for hour {}", hour_timestamp))
}

/// Fetch a contiguous window of hours ending just before `end_hour`. Hours
/// that no source can produce are logged and left out; the trend engine
/// treats them as gaps.
pub async fn fetch_hour_window(
    sources: &[Box<dyn HourlyDataSource>],
    realm: Realm,
    end_hour: i64,
    hours: usize,
) -> Vec<(i64, HourlyDigest)> {
    let mut window = Vec::with_capacity(hours);
    for i in (1..=hours as i64).rev() {
        let ts = end_hour - i * TimeUtils::SEC_IN_HOUR;
        match get_hourly_digest(sources, realm, ts).await {
            Ok((digest, signature)) => {
                log::debug!(
                    "hour {} loaded via {} ({} markets)",
                    ts,
                    signature,
                    digest.markets.len()
                );
                window.push((ts, digest));
            }
            Err(e) => log::warn!("Skipping hour {}: {:#}", ts, e),
        }
    }
    window
}

/// Construct an authenticated client from the token file written by the
/// fetch-token binary.
pub fn authenticated_client() -> Result<Arc<PoeApiClient>> {
    let token = auth::load_access_token(Path::new(POE_API.token_file))?;
    Ok(Arc::new(PoeApiClient::new(&token)?))
}
