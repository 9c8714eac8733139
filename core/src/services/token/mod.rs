//! Token service module for session credential management
//!
//! This module handles all token-related operations including:
//! - Signing and verifying claims (HS256 JWT)
//! - Issuing access/refresh pairs and storing refresh records
//! - Refreshing access tokens from live sessions
//! - Revoking single sessions and bulk revoking by principal or tenant
//! - Publishing session lifecycle events

pub mod clock;
mod codec;
mod config;
mod events;
mod issuer;
mod records;
mod refresh;
mod revocation;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::ClaimsCodec;
pub use config::TokenServiceConfig;
pub use events::{SessionEvent, SessionEventKind, SessionEventPublisher};
pub use issuer::{generate_token_id, TokenIssuer, TOKEN_ID_BYTES};
pub use records::{principal_index_key, record_key, tenant_index_key, RefreshRecordStore};
pub use refresh::RefreshCoordinator;
pub use revocation::RevocationService;
pub use service::TokenService;
