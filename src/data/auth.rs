//! OAuth2 client-credentials flow for the currency exchange API.
//!
//! Credentials come from the environment, never from source. The resulting
//! token is persisted to disk so analysis runs don't need the secret at all.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::POE_API;

/// Token grant response, persisted verbatim so unknown fields survive a
/// round trip.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Confidential client credentials read from the environment.
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var(POE_API.oauth.client_id_env)
            .with_context(|| format!("{} is not set", POE_API.oauth.client_id_env))?;
        let client_secret = std::env::var(POE_API.oauth.client_secret_env)
            .with_context(|| format!("{} is not set", POE_API.oauth.client_secret_env))?;
        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

/// Exchange client credentials for an access token.
pub async fn request_token(credentials: &ClientCredentials) -> Result<TokenGrant> {
    let client = reqwest::Client::builder()
        .user_agent(POE_API.user_agent)
        .build()
        .context("Failed to build token client")?;

    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("grant_type", "client_credentials"),
        ("scope", POE_API.oauth.scope),
    ];

    let resp = client
        .post(POE_API.oauth.token_url)
        .form(&params)
        .send()
        .await
        .context("POST to token endpoint failed")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("Token request failed with {}: {}", status, text);
    }

    resp.json::<TokenGrant>()
        .await
        .context("Failed to parse token response")
}

pub fn save_token(path: &Path, grant: &TokenGrant) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create token file: {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), grant)
        .with_context(|| format!("Failed to write token to: {}", path.display()))
}

/// Load a previously saved access token. The hint about `fetch-token` is the
/// first thing a new user sees, so keep it actionable.
pub fn load_access_token(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).with_context(|| {
        format!(
            "Failed to open token file {} (run the fetch-token binary first)",
            path.display()
        )
    })?;
    let grant: TokenGrant = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse token file: {}", path.display()))?;
    Ok(grant.access_token)
}
