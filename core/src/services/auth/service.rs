//! Main authentication service implementation

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::{Claims, TokenDetails};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{DirectoryRepository, TokenStore};
use crate::services::authorization::{extract_bearer, AccessPolicy, RequestAuthorizer};
use crate::services::token::TokenService;

use super::password::PasswordVerifier;

/// Authentication service for login and the session operations around it
pub struct AuthService<D, S>
where
    D: DirectoryRepository,
    S: TokenStore + 'static,
{
    /// Read-only identity directory
    directory: Arc<D>,
    /// Credential hash verifier
    passwords: Arc<dyn PasswordVerifier>,
    /// Token lifecycle
    tokens: Arc<TokenService<S>>,
}

impl<D, S> AuthService<D, S>
where
    D: DirectoryRepository,
    S: TokenStore + 'static,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `directory` - Lookup of principals, tenants and groups
    /// * `passwords` - Verifier for stored credential hashes
    /// * `tokens` - Token service issuing and revoking sessions
    pub fn new(directory: Arc<D>, passwords: Arc<dyn PasswordVerifier>, tokens: Arc<TokenService<S>>) -> Self {
        Self {
            directory,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService<S>> {
        &self.tokens
    }

    /// Authenticate a principal and issue a new session
    ///
    /// An unknown login and a wrong password fail the same way.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenDetails)` - Access and refresh tokens of the new session
    /// * `Err(DomainError)` - Credentials rejected, principal or tenant unusable,
    ///   or the session could not be stored
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<TokenDetails> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::Validation {
                message: "username and password are required".to_string(),
            });
        }

        let principal = match self.directory.resolve_principal_by_login(username).await? {
            Some(principal) => principal,
            None => {
                self.passwords.verify_absent(password).await;
                info!(username, "Login rejected, unknown principal");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.passwords.verify(password, &principal.password_hash).await? {
            info!(principal_id = %principal.id, "Login rejected, password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !principal.is_enabled() {
            warn!(principal_id = %principal.id, "Login rejected, principal disabled");
            return Err(AuthError::PrincipalDisabled.into());
        }

        let tenant = self
            .directory
            .resolve_tenant_by_id(principal.tenant_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("tenant {}", principal.tenant_id),
            })?;
        if !tenant.active {
            warn!(principal_id = %principal.id, tenant_id = %tenant.id, "Login rejected, tenant inactive");
            return Err(AuthError::TenantInactive.into());
        }

        let group = match tenant.group_id {
            Some(group_id) => Some(
                self.directory
                    .resolve_tenant_group_by_id(group_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound {
                        resource: format!("tenant group {}", group_id),
                    })?,
            ),
            None => None,
        };

        self.tokens.issue(&principal, &tenant, group.as_ref()).await
    }

    /// Mint a new access token from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenDetails> {
        self.tokens.refresh(refresh_token).await
    }

    /// Run the gate on an `Authorization` header value with no role restriction
    pub async fn validate(&self, authorization: Option<&str>) -> DomainResult<Claims> {
        let session = self
            .tokens
            .gate()
            .authorize(authorization, &AccessPolicy::any())
            .await?;
        Ok(session.claims().clone())
    }

    /// Revoke the session behind a bearer token of either kind
    ///
    /// Returns `false` when the session was already gone.
    pub async fn logout(&self, authorization: Option<&str>) -> DomainResult<bool> {
        let token = extract_bearer(authorization)?;
        let claims = self.tokens.decode(token)?;
        self.tokens.revoke(&claims.token_id).await
    }
}
