//! Business services containing domain logic and use cases.

pub mod auth;
pub mod authorization;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, PasswordVerifier};
pub use authorization::{
    extract_bearer, AccessPolicy, AuthorizationGate, PermissionOracle, RequestAuthorizer,
    SessionContext, TenantScope,
};
pub use token::{
    Clock, ManualClock, SessionEvent, SessionEventKind, SystemClock, TokenService,
    TokenServiceConfig,
};
