//! Error kinds for token handling and authentication.
//!
//! The messages here are for logs. The HTTP layer decides what a client sees,
//! and the authorization gate never forwards them.

use thiserror::Error;

use crate::domain::entities::TokenKind;

/// Token codec and session lifecycle failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    SignatureInvalid,

    #[error("Token expired")]
    Expired,

    #[error("Wrong token kind: expected {expected} token")]
    WrongTokenKind { expected: TokenKind },

    #[error("Session revoked")]
    Revoked,
}

/// Authentication and authorization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or malformed bearer credential")]
    MissingCredential,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Principal disabled")]
    PrincipalDisabled,

    #[error("Tenant inactive")]
    TenantInactive,

    #[error("Role {role} is not allowed for this operation")]
    RoleForbidden { role: String },

    #[error("Access to tenant {tenant_id} is outside the session scope")]
    TenantForbidden { tenant_id: String },

    #[error("Permission denied for relation {relation}")]
    PermissionDenied { relation: String },
}
