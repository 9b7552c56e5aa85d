//! Path of Exile API configuration constants and types.

/// Configuration for the REST client defaults
pub struct ClientDefaults {
    pub timeout_ms: u64,
    // Fallback wait when a 429 arrives without a Retry-After header (seconds)
    pub default_retry_after_sec: u64,
}

/// Configuration for OAuth2 client-credentials flow
pub struct OauthConfig {
    pub token_url: &'static str,
    // Scope granting access to the currency exchange endpoint
    pub scope: &'static str,
    // Environment variables holding the confidential client credentials.
    // Never bake the values themselves into the binary.
    pub client_id_env: &'static str,
    pub client_secret_env: &'static str,
}

/// The Master API Configuration Struct
pub struct PoeApiConfig {
    pub base_url: &'static str,
    pub user_agent: &'static str,
    pub token_file: &'static str,
    pub cache_dir: &'static str,
    pub oauth: OauthConfig,
    pub client: ClientDefaults,
}

pub const POE_API: PoeApiConfig = PoeApiConfig {
    base_url: "https://api.pathofexile.com",
    user_agent: concat!("orbscreen/", env!("CARGO_PKG_VERSION")),
    token_file: "token.json",
    cache_dir: "data_exports",

    oauth: OauthConfig {
        token_url: "https://www.pathofexile.com/oauth/token",
        scope: "service:cxapi",
        client_id_env: "POE_CLIENT_ID",
        client_secret_env: "POE_CLIENT_SECRET",
    },

    client: ClientDefaults {
        timeout_ms: 15_000,
        default_retry_after_sec: 60,
    },
};
