//! Authenticated REST client for the currency exchange endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

use crate::config::POE_API;
use crate::domain::{HourlyDigest, Realm};

pub struct PoeApiClient {
    client: Client,
}

impl PoeApiClient {
    pub fn new(access_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(POE_API.client.timeout_ms))
            .user_agent(POE_API.user_agent)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    format!("Bearer {}", access_token)
                        .parse()
                        .context("Access token is not a valid header value")?,
                );
                headers
            })
            .build()
            .context("Failed to build API client")?;

        Ok(Self { client })
    }

    fn markets_url(&self, realm: Realm, hour_timestamp: i64) -> String {
        match realm.api_segment() {
            Some(segment) => format!(
                "{}/currency-exchange/{}/{}",
                POE_API.base_url, segment, hour_timestamp
            ),
            None => format!("{}/currency-exchange/{}", POE_API.base_url, hour_timestamp),
        }
    }

    /// Fetch one hour's markets. A 429 is retried exactly once after honouring
    /// Retry-After; every other non-success status is an error.
    pub async fn fetch_markets(&self, realm: Realm, hour_timestamp: i64) -> Result<HourlyDigest> {
        let url = self.markets_url(realm, hour_timestamp);

        let mut resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let wait_sec = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(POE_API.client.default_retry_after_sec);
            log::warn!("Rate limited on {}; waiting {}s before retry", url, wait_sec);
            tokio::time::sleep(Duration::from_secs(wait_sec)).await;

            resp = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("GET {} failed on retry", url))?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} returned {}: {}", url, status, text);
        }

        resp.json::<HourlyDigest>()
            .await
            .with_context(|| format!("Failed to parse markets response from {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_omits_segment_for_default_realm() {
        let client = PoeApiClient::new("t").unwrap();
        assert_eq!(
            client.markets_url(Realm::Poe1, 1_700_000_000),
            "https://api.pathofexile.com/currency-exchange/1700000000"
        );
    }

    #[test]
    fn url_includes_segment_for_poe2() {
        let client = PoeApiClient::new("t").unwrap();
        assert_eq!(
            client.markets_url(Realm::Poe2, 1_700_000_000),
            "https://api.pathofexile.com/currency-exchange/poe2/1700000000"
        );
    }
}
