//! Token service: wires the codec, issuer, refresh coordinator, revocation
//! service and authorization gate around one token store.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Claims, Principal, Tenant, TenantGroup, TokenDetails};
use crate::errors::DomainError;
use crate::repositories::TokenStore;
use crate::services::authorization::{
    AccessPolicy, AuthorizationGate, PermissionOracle, RequestAuthorizer, SessionContext,
};

use super::clock::Clock;
use super::codec::ClaimsCodec;
use super::config::TokenServiceConfig;
use super::events::SessionEventPublisher;
use super::issuer::TokenIssuer;
use super::records::RefreshRecordStore;
use super::refresh::RefreshCoordinator;
use super::revocation::RevocationService;

/// Service for the whole session token lifecycle
pub struct TokenService<S: TokenStore> {
    config: TokenServiceConfig,
    codec: Arc<ClaimsCodec>,
    issuer: TokenIssuer<S>,
    refresher: RefreshCoordinator<S>,
    revocation: RevocationService<S>,
    gate: AuthorizationGate<S>,
}

impl<S: TokenStore> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Token store holding refresh records
    /// * `config` - Secret, lifetimes and store deadline
    /// * `clock` - Time source for stamping and expiry
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or `DomainError::Configuration` if the config is unusable
    pub fn new(store: Arc<S>, config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        config.validate()?;

        let codec = Arc::new(ClaimsCodec::new(&config.jwt_secret, Arc::clone(&clock))?);
        let records = RefreshRecordStore::new(Arc::clone(&store), Arc::clone(&clock), config.store_deadline);

        let mut issuer = TokenIssuer::new(
            Arc::clone(&codec),
            records.clone(),
            Arc::clone(&clock),
            config.access_ttl,
            config.refresh_ttl,
        );
        let refresher = RefreshCoordinator::new(
            Arc::clone(&codec),
            records.clone(),
            Arc::clone(&clock),
            config.access_ttl,
        );
        let mut revocation = RevocationService::new(records.clone());
        let gate = AuthorizationGate::new(Arc::clone(&codec), records, config.check_liveness);

        if let Some(channel) = &config.events_channel {
            let events = Arc::new(SessionEventPublisher::new(
                store,
                channel.clone(),
                clock,
                config.store_deadline,
            ));
            issuer = issuer.with_events(Arc::clone(&events));
            revocation = revocation.with_events(events);
        }

        Ok(Self {
            config,
            codec,
            issuer,
            refresher,
            revocation,
            gate,
        })
    }

    /// Attach a permission oracle for relation checks
    pub fn with_oracle(mut self, oracle: Arc<dyn PermissionOracle>) -> Self {
        self.gate = self.gate.with_oracle(oracle);
        self
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn codec(&self) -> &ClaimsCodec {
        &self.codec
    }

    pub fn gate(&self) -> &AuthorizationGate<S> {
        &self.gate
    }

    pub async fn issue(
        &self,
        principal: &Principal,
        tenant: &Tenant,
        group: Option<&TenantGroup>,
    ) -> Result<TokenDetails, DomainError> {
        self.issuer.issue(principal, tenant, group).await
    }

    pub async fn issue_with_ttl(
        &self,
        principal: &Principal,
        tenant: &Tenant,
        group: Option<&TenantGroup>,
        access_ttl: chrono::Duration,
        refresh_ttl: chrono::Duration,
    ) -> Result<TokenDetails, DomainError> {
        self.issuer
            .issue_with_ttl(principal, tenant, group, access_ttl, refresh_ttl)
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenDetails, DomainError> {
        self.refresher.refresh(refresh_token).await
    }

    /// Verify a token of either kind
    pub fn decode(&self, token: &str) -> Result<Claims, DomainError> {
        self.codec.decode(token)
    }

    pub async fn revoke(&self, token_id: &str) -> Result<bool, DomainError> {
        self.revocation.revoke(token_id).await
    }

    pub async fn revoke_all_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        self.revocation.revoke_all_for_principal(principal_id).await
    }

    pub async fn revoke_all_for_tenant(&self, tenant_id: Uuid) -> Result<usize, DomainError> {
        self.revocation.revoke_all_for_tenant(tenant_id).await
    }

    /// Run the authorization gate on a raw bearer token
    pub async fn authorize_token(&self, token: &str, policy: &AccessPolicy) -> Result<SessionContext, DomainError> {
        self.gate.authorize_token(token, policy).await
    }
}

#[async_trait]
impl<S: TokenStore + 'static> RequestAuthorizer for TokenService<S> {
    async fn authorize(
        &self,
        authorization: Option<&str>,
        policy: &AccessPolicy,
    ) -> Result<SessionContext, DomainError> {
        self.gate.authorize(authorization, policy).await
    }
}
