//! # Access Core
//!
//! Token lifecycle and authorization layer of the multi-tenant identity backend.
//! This crate contains domain entities, the claims codec, token issuance,
//! refresh and revocation, the authorization gate, repository interfaces
//! and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
