//! Authorization gate decisions

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Role, TokenKind};
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::TokenStore;
use crate::services::authorization::{AccessPolicy, PermissionOracle, RequestAuthorizer};
use crate::services::token::{record_key, TokenServiceConfig};
use crate::test_support::{self, Fixture};

/// Oracle granting a fixed set of (principal, relation, tenant) tuples
struct StaticOracle {
    grants: HashSet<(Uuid, String, Uuid)>,
}

#[async_trait]
impl PermissionOracle for StaticOracle {
    async fn check(&self, principal_id: Uuid, relation: &str, tenant_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .grants
            .contains(&(principal_id, relation.to_string(), tenant_id)))
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_valid_access_token_passes() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    let session = fx
        .tokens
        .gate()
        .authorize(Some(&bearer(&details.access_token)), &AccessPolicy::any())
        .await
        .unwrap();

    assert_eq!(session.principal_id(), fx.principal.id);
    assert_eq!(session.role(), Role::Professor);
    assert_eq!(session.token_id(), details.token_id);
    assert_eq!(session.tenant().tenant_id(), fx.tenant.id);
}

#[tokio::test]
async fn test_missing_or_malformed_header_is_rejected_before_decoding() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    for header in [None, Some(details.access_token.clone()), Some(format!("Token {}", details.access_token))] {
        let result = fx.tokens.gate().authorize(header.as_deref(), &AccessPolicy::any()).await;
        assert_eq!(result, Err(DomainError::Auth(AuthError::MissingCredential)));
    }
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    let refresh_token = details.refresh_token.unwrap();

    let result = fx
        .tokens
        .gate()
        .authorize(Some(&bearer(&refresh_token)), &AccessPolicy::any())
        .await;
    assert_eq!(
        result,
        Err(DomainError::Token(TokenError::WrongTokenKind {
            expected: TokenKind::Access
        }))
    );
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    fx.clock.advance(Duration::minutes(16));
    let result = fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await;
    assert_eq!(result, Err(DomainError::Token(TokenError::Expired)));
}

#[tokio::test]
async fn test_role_membership_is_enforced() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    let admins_only = AccessPolicy::roles(&[Role::Admin]);
    assert!(matches!(
        fx.tokens.authorize_token(&details.access_token, &admins_only).await,
        Err(DomainError::Auth(AuthError::RoleForbidden { .. }))
    ));

    let staff = AccessPolicy::roles(&[Role::Professor, Role::Institution]);
    assert!(fx.tokens.authorize_token(&details.access_token, &staff).await.is_ok());
}

#[tokio::test]
async fn test_without_liveness_check_revoked_session_passes_until_expiry() {
    let config = TokenServiceConfig {
        check_liveness: false,
        ..test_support::config()
    };
    let fx = Fixture::with_config(config);
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    fx.tokens.revoke(&details.token_id).await.unwrap();
    assert!(fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await.is_ok());

    // The window closes when the access token expires
    fx.clock.advance(Duration::minutes(15) + Duration::seconds(1));
    assert_eq!(
        fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await,
        Err(DomainError::Token(TokenError::Expired))
    );
}

#[tokio::test]
async fn test_record_of_another_principal_reads_as_revoked() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    // Overwrite the session's record with one naming someone else
    let key = record_key(&details.token_id);
    let raw = fx.store.get(&key).await.unwrap().unwrap();
    let mut record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    record["user_id"] = serde_json::Value::String(Uuid::new_v4().to_string());
    fx.store
        .set(&key, &record.to_string(), std::time::Duration::from_secs(3600))
        .await
        .unwrap();

    assert_eq!(
        fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await,
        Err(DomainError::Token(TokenError::Revoked))
    );
    assert_eq!(
        fx.tokens.refresh(details.refresh_token.as_deref().unwrap()).await,
        Err(DomainError::Token(TokenError::Revoked))
    );
}

#[tokio::test]
async fn test_tenant_scope_binds_to_claims() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    let session = fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await.unwrap();

    assert!(session.tenant().ensure(fx.tenant.id).is_ok());
    assert!(matches!(
        session.ensure_tenant_access(Uuid::new_v4()),
        Err(DomainError::Auth(AuthError::TenantForbidden { .. }))
    ));
}

#[tokio::test]
async fn test_admin_reaches_other_tenants() {
    let fx = Fixture::new();
    let admin = test_support::principal(&fx.tenant, "root", Role::Admin);
    let details = fx.tokens.issue(&admin, &fx.tenant, None).await.unwrap();
    let session = fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await.unwrap();

    assert!(session.ensure_tenant_access(Uuid::new_v4()).is_ok());
    assert!(session.tenant().ensure(Uuid::new_v4()).is_err());
}

#[tokio::test]
async fn test_relation_policy_consults_the_oracle() {
    let fx = Fixture::new();
    let mut grants = HashSet::new();
    grants.insert((fx.principal.id, "can_manage_sessions".to_string(), fx.tenant.id));

    let fx = Fixture {
        tokens: fx.tokens.with_oracle(Arc::new(StaticOracle { grants })),
        ..fx
    };
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    let granted = AccessPolicy::any().with_relation("can_manage_sessions");
    assert!(fx.tokens.authorize_token(&details.access_token, &granted).await.is_ok());

    let denied = AccessPolicy::any().with_relation("can_delete_tenant");
    assert_eq!(
        fx.tokens.authorize_token(&details.access_token, &denied).await,
        Err(DomainError::Auth(AuthError::PermissionDenied {
            relation: "can_delete_tenant".to_string()
        }))
    );
}

#[tokio::test]
async fn test_relation_policy_without_oracle_is_a_configuration_error() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    let policy = AccessPolicy::any().with_relation("can_manage_sessions");
    assert!(matches!(
        fx.tokens.authorize_token(&details.access_token, &policy).await,
        Err(DomainError::Configuration { .. })
    ));
}
