//! Authorization gate run in front of every protected operation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::TokenKind;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::TokenStore;
use crate::services::token::{ClaimsCodec, RefreshRecordStore};

use super::oracle::PermissionOracle;
use super::policy::{AccessPolicy, SessionContext};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, DomainError> {
    let token = authorization
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredential.into());
    }
    Ok(token)
}

/// Object-safe entry point used by request middleware
#[async_trait]
pub trait RequestAuthorizer: Send + Sync {
    async fn authorize(
        &self,
        authorization: Option<&str>,
        policy: &AccessPolicy,
    ) -> Result<SessionContext, DomainError>;
}

pub struct AuthorizationGate<S: TokenStore> {
    codec: Arc<ClaimsCodec>,
    records: RefreshRecordStore<S>,
    oracle: Option<Arc<dyn PermissionOracle>>,
    check_liveness: bool,
}

impl<S: TokenStore> AuthorizationGate<S> {
    pub fn new(codec: Arc<ClaimsCodec>, records: RefreshRecordStore<S>, check_liveness: bool) -> Self {
        Self {
            codec,
            records,
            oracle: None,
            check_liveness,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn PermissionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Check a bearer token against `policy`.
    ///
    /// Steps, each fatal on failure: decode, require an access token, check
    /// the session is still live (when enabled), check the role, consult the
    /// permission oracle for the policy's relation.
    pub async fn authorize_token(
        &self,
        token: &str,
        policy: &AccessPolicy,
    ) -> Result<SessionContext, DomainError> {
        let claims = self.codec.decode(token)?;

        if !claims.is_access() {
            return Err(TokenError::WrongTokenKind {
                expected: TokenKind::Access,
            }
            .into());
        }

        // Without this check a revoked session stays usable until its access token expires
        if self.check_liveness {
            let live = match self.records.find(&claims.token_id).await? {
                Some(record) => record.matches(&claims),
                None => false,
            };
            if !live {
                return Err(TokenError::Revoked.into());
            }
        }

        if !policy.permits(claims.role) {
            return Err(AuthError::RoleForbidden {
                role: claims.role.to_string(),
            }
            .into());
        }

        let session = SessionContext::new(claims);
        if let Some(relation) = policy.relation() {
            self.check_relation(&session, relation).await?;
        }

        debug!(
            principal_id = %session.principal_id(),
            tenant_id = %session.tenant().tenant_id(),
            token_id = %session.token_id(),
            "Request authorized"
        );
        Ok(session)
    }

    /// Ask the permission oracle whether the caller holds `relation` on their own tenant
    pub async fn check_relation(&self, session: &SessionContext, relation: &str) -> Result<(), DomainError> {
        let oracle = self
            .oracle
            .as_ref()
            .ok_or_else(|| DomainError::configuration("no permission oracle configured"))?;

        let allowed = oracle
            .check(session.principal_id(), relation, session.tenant().tenant_id())
            .await?;
        if allowed {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied {
                relation: relation.to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl<S: TokenStore + 'static> RequestAuthorizer for AuthorizationGate<S> {
    async fn authorize(
        &self,
        authorization: Option<&str>,
        policy: &AccessPolicy,
    ) -> Result<SessionContext, DomainError> {
        let outcome = match extract_bearer(authorization) {
            Ok(token) => self.authorize_token(token, policy).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!(kind = e.kind(), error = %e, "Request rejected by authorization gate");
        }
        outcome
    }
}
