//! Logout and bulk revocation

use chrono::Duration;

use crate::domain::entities::Role;
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenStore;
use crate::services::authorization::AccessPolicy;
use crate::services::token::{principal_index_key, tenant_index_key, SessionEvent, SessionEventKind};
use crate::test_support::{self, Fixture, EVENTS_CHANNEL};

#[tokio::test]
async fn test_revoke_blocks_refresh() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    let refresh_token = details.refresh_token.unwrap();

    assert!(fx.tokens.revoke(&details.token_id).await.unwrap());

    assert_eq!(
        fx.tokens.refresh(&refresh_token).await,
        Err(DomainError::Token(TokenError::Revoked))
    );
}

#[tokio::test]
async fn test_revoked_access_token_still_decodes_but_fails_the_gate() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    fx.tokens.revoke(&details.token_id).await.unwrap();

    // Signature and expiry alone cannot see the revocation
    let claims = fx.tokens.decode(&details.access_token).unwrap();
    assert_eq!(claims.token_id, details.token_id);

    assert_eq!(
        fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await,
        Err(DomainError::Token(TokenError::Revoked))
    );
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    assert!(fx.tokens.revoke(&details.token_id).await.unwrap());
    assert!(!fx.tokens.revoke(&details.token_id).await.unwrap());
    assert!(!fx.tokens.revoke("never-issued").await.unwrap());
}

#[tokio::test]
async fn test_revoke_cleans_indexes() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    fx.tokens.revoke(&details.token_id).await.unwrap();

    assert!(fx
        .store
        .index_members(&principal_index_key(fx.principal.id))
        .await
        .unwrap()
        .is_empty());
    assert!(fx
        .store
        .index_members(&tenant_index_key(fx.tenant.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_revoke_all_for_principal_leaves_others_alone() {
    let fx = Fixture::new();
    let colleague = test_support::principal(&fx.tenant, "carla", Role::Student);

    let mine: Vec<_> = vec![
        fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap(),
        fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap(),
    ];
    let theirs = fx.tokens.issue(&colleague, &fx.tenant, None).await.unwrap();

    let count = fx.tokens.revoke_all_for_principal(fx.principal.id).await.unwrap();
    assert_eq!(count, 2);

    for details in mine {
        assert_eq!(
            fx.tokens.refresh(details.refresh_token.as_deref().unwrap()).await,
            Err(DomainError::Token(TokenError::Revoked))
        );
    }
    assert!(fx
        .tokens
        .refresh(theirs.refresh_token.as_deref().unwrap())
        .await
        .is_ok());

    // The colleague is still listed under the tenant
    assert_eq!(
        fx.store.index_members(&tenant_index_key(fx.tenant.id)).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_revoke_all_for_tenant() {
    let fx = Fixture::new();
    let other_tenant = test_support::tenant(None);
    let colleague = test_support::principal(&fx.tenant, "carla", Role::Student);
    let outsider = test_support::principal(&other_tenant, "davi", Role::Admin);

    let a = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    let b = fx.tokens.issue(&colleague, &fx.tenant, None).await.unwrap();
    let c = fx.tokens.issue(&outsider, &other_tenant, None).await.unwrap();

    assert_eq!(fx.tokens.revoke_all_for_tenant(fx.tenant.id).await.unwrap(), 2);

    for details in [&a, &b] {
        assert_eq!(
            fx.tokens.refresh(details.refresh_token.as_deref().unwrap()).await,
            Err(DomainError::Token(TokenError::Revoked))
        );
    }
    assert!(fx.tokens.refresh(c.refresh_token.as_deref().unwrap()).await.is_ok());

    // Principal indexes were cleaned in the same step
    assert!(fx
        .store
        .index_members(&principal_index_key(colleague.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_bulk_revoke_counts_only_live_sessions() {
    let fx = Fixture::new();

    fx.tokens
        .issue_with_ttl(&fx.principal, &fx.tenant, None, Duration::minutes(1), Duration::minutes(5))
        .await
        .unwrap();
    fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();

    fx.clock.advance(Duration::minutes(10));
    assert_eq!(fx.tokens.revoke_all_for_principal(fx.principal.id).await.unwrap(), 1);
    assert!(fx
        .store
        .index_members(&principal_index_key(fx.principal.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_bulk_revoke_of_unknown_scope_is_zero() {
    let fx = Fixture::new();
    assert_eq!(fx.tokens.revoke_all_for_tenant(uuid::Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_revocations_publish_session_events() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    let mut events = fx.store.subscribe();

    fx.tokens.revoke(&details.token_id).await.unwrap();
    fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    fx.tokens.revoke_all_for_tenant(fx.tenant.id).await.unwrap();

    let logout = events.recv().await.unwrap();
    assert_eq!(logout.channel, EVENTS_CHANNEL);
    let logout: SessionEvent = serde_json::from_str(&logout.payload).unwrap();
    assert_eq!(logout.event, SessionEventKind::Logout);
    assert_eq!(logout.token_id.as_deref(), Some(details.token_id.as_str()));

    let issued: SessionEvent = serde_json::from_str(&events.recv().await.unwrap().payload).unwrap();
    assert_eq!(issued.event, SessionEventKind::Issued);

    let bulk: SessionEvent = serde_json::from_str(&events.recv().await.unwrap().payload).unwrap();
    assert_eq!(bulk.event, SessionEventKind::TenantRevoked);
    assert_eq!(bulk.scope, Some(fx.tenant.id));
    assert_eq!(bulk.count, Some(1));
}
