//! In-memory directory for tests and local runs

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Principal, Tenant, TenantGroup};
use crate::errors::DomainError;

use super::r#trait::DirectoryRepository;

/// Directory backed by hash maps
#[derive(Default)]
pub struct InMemoryDirectory {
    principals: RwLock<HashMap<String, Principal>>,
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    groups: RwLock<HashMap<Uuid, TenantGroup>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals
            .get_mut()
            .insert(principal.username.clone(), principal);
        self
    }

    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.get_mut().insert(tenant.id, tenant);
        self
    }

    pub fn with_group(mut self, group: TenantGroup) -> Self {
        self.groups.get_mut().insert(group.id, group);
        self
    }

    /// Replace a tenant, e.g. to rename or deactivate it mid-session
    pub async fn upsert_tenant(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn upsert_principal(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.username.clone(), principal);
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectory {
    async fn resolve_principal_by_login(&self, username: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self.principals.read().await.get(username).cloned())
    }

    async fn resolve_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn resolve_tenant_group_by_id(&self, id: Uuid) -> Result<Option<TenantGroup>, DomainError> {
        Ok(self.groups.read().await.get(&id).cloned())
    }
}
