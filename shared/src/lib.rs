//! Shared configuration and response types for the access backend
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures and error codes
//! - Common response bodies

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, LogFormat, LoggingConfig, PermissionConfig, ServerConfig, TokenStoreBackend,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus};
