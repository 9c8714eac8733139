//! Redis implementation of the `TokenStore` trait.
//!
//! Keys and index names are namespaced with the configured prefix; index
//! members are stored as logical keys so callers can feed them straight
//! back into `get` and `delete_indexed`.

use async_trait::async_trait;
use std::time::Duration;

use ac_core::errors::DomainError;
use ac_core::repositories::TokenStore;

use super::redis_client::RedisClient;

/// Token store backed by Redis
#[derive(Clone)]
pub struct RedisTokenStore {
    client: RedisClient,
}

impl RedisTokenStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }

    fn keys(&self, indexes: &[String]) -> Vec<String> {
        indexes.iter().map(|index| self.key(index)).collect()
    }
}

/// Whole seconds for `EX`, rounded up so a record never outlives its TTL early
pub(crate) fn ttl_seconds(ttl: Duration) -> Result<u64, DomainError> {
    if ttl.is_zero() {
        return Err(DomainError::configuration("token store TTL must be positive"));
    }
    let secs = ttl.as_secs();
    Ok(if ttl.subsec_nanos() > 0 { secs + 1 } else { secs })
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let secs = ttl_seconds(ttl)?;
        self.client
            .set_with_expiry(&self.key(key), value, secs)
            .await
            .map_err(DomainError::from)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.client.get(&self.key(key)).await.map_err(DomainError::from)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.client.delete(&self.key(key)).await.map_err(DomainError::from)
    }

    async fn set_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        indexes: &[String],
    ) -> Result<(), DomainError> {
        let secs = ttl_seconds(ttl)?;
        self.client
            .set_with_members(&self.key(key), value, secs, &self.keys(indexes), key)
            .await
            .map_err(DomainError::from)
    }

    async fn delete_indexed(&self, key: &str, indexes: &[String]) -> Result<bool, DomainError> {
        self.client
            .delete_with_members(&self.key(key), &self.keys(indexes), key)
            .await
            .map_err(DomainError::from)
    }

    async fn index_members(&self, index: &str) -> Result<Vec<String>, DomainError> {
        self.client.members(&self.key(index)).await.map_err(DomainError::from)
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, DomainError> {
        self.client
            .publish(channel, message)
            .await
            .map_err(DomainError::from)
    }
}
