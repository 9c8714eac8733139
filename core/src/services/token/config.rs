//! Configuration for the token service

use ac_shared::config::{AuthConfig, CacheConfig};
use chrono::Duration;

use crate::errors::DomainError;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Deadline applied to every token store call
    pub store_deadline: std::time::Duration,
    /// Check the refresh record on every access token use
    pub check_liveness: bool,
    /// Channel session events are published on; `None` disables publishing
    pub events_channel: Option<String>,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            store_deadline: std::time::Duration::from_secs(2),
            check_liveness: true,
            events_channel: None,
        }
    }
}

impl TokenServiceConfig {
    /// Builds the service configuration from the application sections
    pub fn from_app_config(auth: &AuthConfig, cache: &CacheConfig) -> Self {
        Self {
            jwt_secret: auth.jwt.secret.clone(),
            access_ttl: auth.jwt.access_ttl(),
            refresh_ttl: auth.jwt.refresh_ttl(),
            store_deadline: cache.command_timeout(),
            check_liveness: auth.session_liveness_check,
            events_channel: cache.pubsub_channel.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.jwt_secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }
        if self.access_ttl <= Duration::zero() || self.refresh_ttl <= Duration::zero() {
            return Err(DomainError::configuration("token lifetimes must be positive"));
        }
        if self.store_deadline.is_zero() {
            return Err(DomainError::configuration("token store deadline must be positive"));
        }
        Ok(())
    }
}
