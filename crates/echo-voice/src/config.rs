use serde::{Deserialize, Serialize};
use std::fmt;

/// Local `livekit-server --dev` endpoint.
pub const DEV_LIVEKIT_URL: &str = "http://localhost:7880";
/// API key accepted by `livekit-server --dev`.
pub const DEV_LIVEKIT_API_KEY: &str = "devkey";
/// API secret accepted by `livekit-server --dev`.
pub const DEV_LIVEKIT_API_SECRET: &str = "secret";

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    /// Server-side API URL used for Room Service calls.
    #[serde(default)]
    pub url: String,
    /// URL handed to the joining agent. Falls back to `url` when empty.
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            public_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("public_url", &self.public_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Configuration for a local `livekit-server --dev` instance.
    pub fn dev() -> Self {
        Self::new(DEV_LIVEKIT_URL, DEV_LIVEKIT_API_KEY, DEV_LIVEKIT_API_SECRET)
    }
}
