//! Directory repository trait: read-only lookups of principals, tenants and groups.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Principal, Tenant, TenantGroup};
use crate::errors::DomainError;

/// Read access to the identity directory
///
/// The directory owns principals and tenants; this side never writes them.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Resolve a principal by login handle
    ///
    /// # Returns
    /// * `Ok(Some(Principal))` - Principal found
    /// * `Ok(None)` - No principal with that login
    /// * `Err(DomainError)` - Lookup failed
    async fn resolve_principal_by_login(&self, username: &str) -> Result<Option<Principal>, DomainError>;

    /// Resolve a tenant by id
    async fn resolve_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError>;

    /// Resolve a tenant group by id
    async fn resolve_tenant_group_by_id(&self, id: Uuid) -> Result<Option<TenantGroup>, DomainError>;
}
