//! Relationship-based permission engine configuration

use serde::{Deserialize, Serialize};

/// Connection settings for the external permission engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PermissionConfig {
    /// Base URL of the engine's HTTP API
    pub api_url: String,

    /// Authorization store the checks run against
    pub store_id: String,

    /// Optional bearer token for the engine
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl PermissionConfig {
    /// Returns `None` unless both `PERMISSION_API_URL` and `PERMISSION_STORE_ID` are set
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("PERMISSION_API_URL").ok().filter(|v| !v.is_empty())?;
        let store_id = std::env::var("PERMISSION_STORE_ID").ok().filter(|v| !v.is_empty())?;

        Some(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            store_id,
            api_token: std::env::var("PERMISSION_API_TOKEN").ok().filter(|v| !v.is_empty()),
            timeout_ms: super::env_or("PERMISSION_TIMEOUT_MS", default_timeout_ms()),
        })
    }

    pub fn check_url(&self) -> String {
        format!("{}/stores/{}/check", self.api_url, self.store_id)
    }
}

fn default_timeout_ms() -> u64 {
    3000
}
