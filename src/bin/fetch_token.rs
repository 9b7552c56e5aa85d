//! One-shot token bootstrap: exchanges the client credentials from the
//! environment for an access token and writes it next to the binary so the
//! screener itself never needs the secret.

use std::path::Path;

use anyhow::Result;

use orbscreen::config::POE_API;
use orbscreen::data::auth;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let credentials = auth::ClientCredentials::from_env()?;
        log::info!("Requesting access token using client credentials grant...");
        let grant = auth::request_token(&credentials).await?;
        auth::save_token(Path::new(POE_API.token_file), &grant)?;
        log::info!("Token saved to {}", POE_API.token_file);
        Ok(())
    })
}
