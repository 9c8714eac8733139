//! Authentication and session token configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Minimum accepted length of the HMAC signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

const DEVELOPMENT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared secret for HS256 signing
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEVELOPMENT_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_expiry)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry)
    }

    /// Check if using the built-in development secret
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }

    /// Reject secrets and lifetimes the token service cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                reason: format!("must be at least {} bytes", MIN_SECRET_LENGTH),
            });
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_TOKEN_EXPIRY".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.refresh_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_TOKEN_EXPIRY".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.refresh_token_expiry < self.access_token_expiry {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_TOKEN_EXPIRY".to_string(),
                reason: "must not be shorter than the access token expiry".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Re-check the refresh record on every access token use.
    /// Without it a revoked session stays usable until its access token expires.
    #[serde(default = "default_liveness_check")]
    pub session_liveness_check: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            session_liveness_check: default_liveness_check(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
        };

        Self {
            jwt,
            session_liveness_check: env_or("AUTH_SESSION_LIVENESS_CHECK", default_liveness_check()),
        }
    }
}

fn default_liveness_check() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = JwtConfig::default();
        assert_eq!(config.access_ttl(), Duration::minutes(15));
        assert_eq!(config.refresh_ttl(), Duration::days(7));
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let config = JwtConfig::new("short");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetimes() {
        let secret = "x".repeat(MIN_SECRET_LENGTH);
        let config = JwtConfig::new(secret.clone()).with_access_expiry_minutes(0);
        assert!(config.validate().is_err());

        let config = JwtConfig::new(secret).with_refresh_expiry_days(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_refresh_shorter_than_access() {
        let mut config = JwtConfig::new("x".repeat(MIN_SECRET_LENGTH));
        config.access_token_expiry = 3600;
        config.refresh_token_expiry = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = JwtConfig::new("x".repeat(64))
            .with_access_expiry_minutes(5)
            .with_refresh_expiry_days(1);
        assert_eq!(config.access_token_expiry, 300);
        assert_eq!(config.refresh_token_expiry, 86400);
        assert!(config.validate().is_ok());
    }
}
