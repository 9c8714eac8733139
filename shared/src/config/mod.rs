//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing secret and lifetimes
//! - `cache` - Redis token store and session event channel
//! - `database` - Directory database connection pool
//! - `environment` - Environment detection and logging configuration
//! - `permission` - External permission engine
//! - `server` - HTTP server and CORS

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod permission;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use permission::PermissionConfig;
pub use server::{CorsConfig, ServerConfig};

/// Configuration errors detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Backing store for refresh records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreBackend {
    #[default]
    Redis,
    /// Process-local store, for local runs without Redis
    Memory,
}

impl std::str::FromStr for TokenStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(TokenStoreBackend::Redis),
            "memory" => Ok(TokenStoreBackend::Memory),
            _ => Err(format!("Invalid token store backend: {}", s)),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Directory database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    #[serde(default)]
    pub token_store: TokenStoreBackend,

    /// Permission engine; `None` disables relation checks
    #[serde(default)]
    pub permission: Option<PermissionConfig>,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            token_store: TokenStoreBackend::default(),
            permission: None,
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Build the full configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            cache: CacheConfig::from_env(),
            token_store: std::env::var("TOKEN_STORE")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            permission: PermissionConfig::from_env(),
            cors: CorsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Validate every section the services depend on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.jwt.validate()?;

        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                reason: "the development secret cannot be used in production".to_string(),
            });
        }
        if self.cache.command_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "REDIS_COMMAND_TIMEOUT_MS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.environment.is_production() && self.token_store == TokenStoreBackend::Memory {
            return Err(ConfigError::Invalid {
                key: "TOKEN_STORE".to_string(),
                reason: "the memory store cannot be shared between instances".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_rejects_development_secret() {
        let mut config = AppConfig::default();
        config.environment = Environment::Production;
        assert!(config.validate().is_err());

        config.auth.jwt.secret = "p".repeat(48);
        assert!(config.validate().is_ok());

        config.token_store = TokenStoreBackend::Memory;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_command_timeout_rejected() {
        let mut config = AppConfig::default();
        config.cache.command_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
