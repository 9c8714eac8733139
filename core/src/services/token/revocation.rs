//! Revocation service: logout and bulk revoke by principal or tenant.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::DomainError;
use crate::repositories::TokenStore;

use super::events::{SessionEvent, SessionEventKind, SessionEventPublisher};
use super::records::{principal_index_key, tenant_index_key, RefreshRecordStore};

pub struct RevocationService<S: TokenStore> {
    records: RefreshRecordStore<S>,
    events: Option<Arc<SessionEventPublisher<S>>>,
}

impl<S: TokenStore> RevocationService<S> {
    pub fn new(records: RefreshRecordStore<S>) -> Self {
        Self {
            records,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<SessionEventPublisher<S>>) -> Self {
        self.events = Some(events);
        self
    }

    /// Delete the refresh record for `token_id`.
    ///
    /// Returns `false` when there was nothing left to revoke.
    pub async fn revoke(&self, token_id: &str) -> Result<bool, DomainError> {
        let revoked = self.records.remove(token_id).await?;
        info!(token_id, revoked, "Revoked session");

        if revoked {
            if let Some(events) = &self.events {
                events.publish(SessionEvent::logout(token_id, events.now())).await;
            }
        }
        Ok(revoked)
    }

    /// Revoke every live session of a principal, returning how many were removed
    pub async fn revoke_all_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        let count = self
            .records
            .remove_indexed(&principal_index_key(principal_id))
            .await?;
        info!(principal_id = %principal_id, count, "Revoked all sessions of principal");

        self.announce(SessionEventKind::PrincipalRevoked, principal_id, count)
            .await;
        Ok(count)
    }

    /// Revoke every live session in a tenant, returning how many were removed
    pub async fn revoke_all_for_tenant(&self, tenant_id: Uuid) -> Result<usize, DomainError> {
        let count = self
            .records
            .remove_indexed(&tenant_index_key(tenant_id))
            .await?;
        info!(tenant_id = %tenant_id, count, "Revoked all sessions of tenant");

        self.announce(SessionEventKind::TenantRevoked, tenant_id, count)
            .await;
        Ok(count)
    }

    async fn announce(&self, kind: SessionEventKind, scope: Uuid, count: usize) {
        if let Some(events) = &self.events {
            events
                .publish(SessionEvent::bulk(kind, scope, count, events.now()))
                .await;
        }
    }
}
