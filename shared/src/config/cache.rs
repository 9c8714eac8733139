//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Redis configuration for the token store and session events
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Deadline for a single store command in milliseconds
    pub command_timeout_ms: u64,

    /// Namespace prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Channel session events are published on
    #[serde(default)]
    pub pubsub_channel: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            command_timeout_ms: 2000,
            key_prefix: None,
            pubsub_channel: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connection_timeout: env_or("REDIS_CONNECTION_TIMEOUT", defaults.connection_timeout),
            command_timeout_ms: env_or("REDIS_COMMAND_TIMEOUT_MS", defaults.command_timeout_ms),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").ok().filter(|p| !p.is_empty()),
            pubsub_channel: std::env::var("REDIS_PUBSUB_CHANNEL").ok().filter(|c| !c.is_empty()),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.command_timeout_ms)
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key_with_and_without_prefix() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("refresh:abc"), "refresh:abc");

        let config = config.with_prefix("ac");
        assert_eq!(config.make_key("refresh:abc"), "ac:refresh:abc");
    }

    #[test]
    fn test_command_timeout() {
        let config = CacheConfig::default();
        assert_eq!(config.command_timeout(), std::time::Duration::from_secs(2));
    }
}
