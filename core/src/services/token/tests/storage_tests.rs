//! Token store failures and deadlines

use std::time::Duration as StdDuration;

use crate::errors::{DomainError, TokenError};
use crate::services::authorization::AccessPolicy;
use crate::test_support::Fixture;

#[tokio::test]
async fn test_issue_fails_without_tokens_when_store_is_down() {
    let fx = Fixture::new();
    fx.store.set_unavailable(true);

    let result = fx.tokens.issue(&fx.principal, &fx.tenant, None).await;
    assert!(matches!(result, Err(DomainError::StorageFailure { .. })));

    fx.store.set_unavailable(false);
    assert!(fx.store.is_empty().await);
}

#[tokio::test]
async fn test_refresh_fails_hard_when_store_is_down() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    fx.store.set_unavailable(true);

    let result = fx.tokens.refresh(details.refresh_token.as_deref().unwrap()).await;
    assert!(matches!(result, Err(DomainError::StorageFailure { .. })));
}

#[tokio::test]
async fn test_gate_does_not_fall_back_to_signature_when_store_is_down() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    fx.store.set_unavailable(true);

    let result = fx.tokens.authorize_token(&details.access_token, &AccessPolicy::any()).await;
    assert!(matches!(result, Err(DomainError::StorageFailure { .. })));
}

#[tokio::test]
async fn test_revoke_reports_store_failure() {
    let fx = Fixture::new();
    fx.store.set_unavailable(true);

    assert!(matches!(
        fx.tokens.revoke("abc").await,
        Err(DomainError::StorageFailure { .. })
    ));
    assert!(matches!(
        fx.tokens.revoke_all_for_principal(fx.principal.id).await,
        Err(DomainError::StorageFailure { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_hits_the_deadline() {
    let fx = Fixture::new();
    fx.store.set_latency(StdDuration::from_secs(5));

    let result = fx.tokens.issue(&fx.principal, &fx.tenant, None).await;
    match result {
        Err(DomainError::StorageFailure { message }) => assert!(message.contains("deadline")),
        other => panic!("expected storage failure, got {:?}", other),
    }

    fx.store.set_latency(StdDuration::ZERO);
    assert!(fx.store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_fails_refresh() {
    let fx = Fixture::new();
    let details = fx.tokens.issue(&fx.principal, &fx.tenant, None).await.unwrap();
    fx.store.set_latency(StdDuration::from_secs(5));

    let result = fx.tokens.refresh(details.refresh_token.as_deref().unwrap()).await;
    assert!(matches!(result, Err(DomainError::StorageFailure { .. })));
    assert_ne!(result, Err(DomainError::Token(TokenError::Revoked)));
}
