//! Authentication service module
//!
//! Login against the identity directory, plus the session operations the
//! HTTP layer exposes on top of the token service:
//! - Credential login issuing an access/refresh pair
//! - Access token refresh
//! - Bearer validation
//! - Logout

mod password;
mod service;


pub use password::PasswordVerifier;
pub use service::AuthService;
