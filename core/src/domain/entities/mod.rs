//! Domain entities representing core business objects.

pub mod principal;
pub mod tenant;
pub mod token;

// Re-export commonly used types
pub use principal::{Principal, Role};
pub use tenant::{Tenant, TenantGroup};
pub use token::{Claims, RefreshRecord, TokenDetails, TokenKind};
