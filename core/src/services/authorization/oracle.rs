//! Relationship-based permission oracle contract.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainError;

/// External engine answering "may principal P hold `relation` on tenant T"
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - Allowed
    /// * `Ok(false)` - Denied
    /// * `Err(DomainError)` - The engine could not be consulted
    async fn check(&self, principal_id: Uuid, relation: &str, tenant_id: Uuid) -> Result<bool, DomainError>;
}
