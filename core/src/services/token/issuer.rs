//! Token issuer: mints an access/refresh pair and registers the session.

use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::{
    Claims, Principal, RefreshRecord, Tenant, TenantGroup, TokenDetails, TokenKind,
};
use crate::errors::DomainError;
use crate::repositories::TokenStore;

use super::clock::Clock;
use super::codec::ClaimsCodec;
use super::events::{SessionEvent, SessionEventPublisher};
use super::records::RefreshRecordStore;

/// Bytes of OS randomness behind a token id
pub const TOKEN_ID_BYTES: usize = 16;

/// Fresh 128-bit session identity, hex-encoded
pub fn generate_token_id() -> String {
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct TokenIssuer<S: TokenStore> {
    codec: Arc<ClaimsCodec>,
    records: RefreshRecordStore<S>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    events: Option<Arc<SessionEventPublisher<S>>>,
}

impl<S: TokenStore> TokenIssuer<S> {
    pub fn new(
        codec: Arc<ClaimsCodec>,
        records: RefreshRecordStore<S>,
        clock: Arc<dyn Clock>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            records,
            clock,
            access_ttl,
            refresh_ttl,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<SessionEventPublisher<S>>) -> Self {
        self.events = Some(events);
        self
    }

    /// Issue a session with the configured lifetimes
    pub async fn issue(
        &self,
        principal: &Principal,
        tenant: &Tenant,
        group: Option<&TenantGroup>,
    ) -> Result<TokenDetails, DomainError> {
        self.issue_with_ttl(principal, tenant, group, self.access_ttl, self.refresh_ttl)
            .await
    }

    /// Issue an access/refresh pair sharing one fresh `token_id`.
    ///
    /// The refresh record is written after both tokens are signed; if that
    /// write fails the tokens are discarded and the error is returned.
    pub async fn issue_with_ttl(
        &self,
        principal: &Principal,
        tenant: &Tenant,
        group: Option<&TenantGroup>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<TokenDetails, DomainError> {
        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(DomainError::configuration(format!(
                "token lifetimes must be positive (access {}s, refresh {}s)",
                access_ttl.num_seconds(),
                refresh_ttl.num_seconds()
            )));
        }
        if principal.tenant_id != tenant.id {
            return Err(DomainError::Validation {
                message: format!("principal {} does not belong to tenant {}", principal.id, tenant.id),
            });
        }
        if let Some(group) = group {
            if tenant.group_id != Some(group.id) {
                return Err(DomainError::Validation {
                    message: format!("tenant {} is not a member of group {}", tenant.id, group.id),
                });
            }
        }

        let token_id = generate_token_id();
        let now = self.clock.now();

        let access_claims = Claims::for_session(
            principal,
            tenant,
            group,
            &token_id,
            TokenKind::Access,
            now,
            now + access_ttl,
        );
        let refresh_claims = Claims::for_session(
            principal,
            tenant,
            group,
            &token_id,
            TokenKind::Refresh,
            now,
            now + refresh_ttl,
        );

        let access_token = self.codec.encode(&access_claims)?;
        let refresh_token = self.codec.encode(&refresh_claims)?;

        let record = RefreshRecord::from_claims(&refresh_claims);
        if let Err(e) = self.records.save(&token_id, &record).await {
            warn!(
                principal_id = %principal.id,
                tenant_id = %tenant.id,
                error = %e,
                "Discarding signed tokens, refresh record was not stored"
            );
            return Err(e);
        }

        info!(
            principal_id = %principal.id,
            tenant_id = %tenant.id,
            role = %principal.role,
            token_id = %token_id,
            "Issued session tokens"
        );

        if let Some(events) = &self.events {
            events
                .publish(SessionEvent::issued(&token_id, principal.id, now))
                .await;
        }

        Ok(TokenDetails {
            access_token,
            refresh_token: Some(refresh_token),
            token_id,
            access_expires_at: access_claims.expires_at(),
        })
    }
}
