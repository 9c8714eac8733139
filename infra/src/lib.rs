//! # Infrastructure Layer
//!
//! Concrete adapters behind the core's collaborator traits:
//! - **Cache**: Redis client and the Redis-backed token store
//! - **Database**: Postgres directory lookups using SQLx
//! - **Security**: bcrypt password verification
//! - **Permission**: HTTP client for the external permission oracle

use ac_core::errors::DomainError;

/// Cache module - Redis client and token store
pub mod cache;

/// Database module - Postgres implementations using SQLx
pub mod database;

/// Permission oracle over HTTP
pub mod permission;

/// Credential hashing
pub mod security;

pub use cache::{RedisClient, RedisTokenStore};
pub use database::{DatabasePool, PgDirectoryRepository};
pub use permission::HttpPermissionOracle;
pub use security::BcryptPasswordVerifier;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend did not answer within its deadline
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(_)
            | InfrastructureError::Cache(_)
            | InfrastructureError::Http(_)
            | InfrastructureError::Timeout { .. } => DomainError::storage(err.to_string()),
            InfrastructureError::Config(message) => DomainError::configuration(message),
            InfrastructureError::General(message) => DomainError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_become_storage_failures() {
        let err: DomainError = InfrastructureError::Timeout {
            operation: "GET".to_string(),
            after_ms: 2000,
        }
        .into();
        assert_eq!(err.kind(), "storage_failure");
        assert!(err.to_string().contains("GET timed out after 2000ms"));

        let err: DomainError = InfrastructureError::Cache(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection reset",
        )))
        .into();
        assert_eq!(err.kind(), "storage_failure");
    }

    #[test]
    fn test_config_and_general_errors_keep_their_class() {
        let err: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        assert_eq!(err, DomainError::configuration("bad url"));

        let err: DomainError = InfrastructureError::General("oops".to_string()).into();
        assert_eq!(err, DomainError::internal("oops"));
    }
}
