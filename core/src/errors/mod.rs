//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Token store unreachable, erroring or past its deadline
    #[error("Storage failure: {message}")]
    StorageFailure { message: String },

    /// Fatal misconfiguration; never retried
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::StorageFailure {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Short stable name of the failure, for logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "validation",
            DomainError::NotFound { .. } => "not_found",
            DomainError::StorageFailure { .. } => "storage_failure",
            DomainError::Configuration { .. } => "configuration_error",
            DomainError::Internal { .. } => "internal",
            DomainError::Auth(err) => match err {
                AuthError::MissingCredential => "malformed",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::PrincipalDisabled => "principal_disabled",
                AuthError::TenantInactive => "tenant_inactive",
                AuthError::RoleForbidden { .. } => "role_forbidden",
                AuthError::TenantForbidden { .. } => "tenant_forbidden",
                AuthError::PermissionDenied { .. } => "permission_denied",
            },
            DomainError::Token(err) => match err {
                TokenError::Malformed => "malformed",
                TokenError::SignatureInvalid => "signature_invalid",
                TokenError::Expired => "expired",
                TokenError::WrongTokenKind { .. } => "wrong_token_kind",
                TokenError::Revoked => "revoked",
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
