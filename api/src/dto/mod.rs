pub mod auth;
pub mod error;
pub mod session;

pub use auth::{LoginRequest, LogoutResponse, TokenResponse, ValidateResponse};
pub use error::{ErrorResponse, ErrorResponseExt};
pub use session::{PermissionCheckRequest, PermissionCheckResponse, RevokeResponse, SessionResponse};
