//! Authorization module: the per-request gate, access policies and the
//! permission oracle contract.

mod gate;
mod oracle;
mod policy;

#[cfg(test)]
mod tests;

pub use gate::{extract_bearer, AuthorizationGate, RequestAuthorizer};
pub use oracle::PermissionOracle;
pub use policy::{AccessPolicy, SessionContext, TenantScope};
