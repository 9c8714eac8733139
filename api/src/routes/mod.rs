//! Route handlers
//!
//! - `user`: login, refresh, validation and logout
//! - `session`: the caller's own session
//! - `admin`: bulk session revocation
//! - `permission`: relation checks against the permission oracle

pub mod admin;
pub mod permission;
pub mod session;
pub mod user;
