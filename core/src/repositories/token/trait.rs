//! Token store trait: the key-value contract refresh records live behind.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::DomainError;

/// TTL-capable key-value store holding refresh records and their indexes.
///
/// Keys are logical (`refresh:<token_id>`); an implementation may namespace
/// them further. Index members are logical record keys.
///
/// # Failure model
/// - Unreachable or erroring backends surface as `DomainError::StorageFailure`
/// - A zero TTL is rejected with `DomainError::Configuration` before any write
/// - Expired entries are indistinguishable from deleted ones
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Read a value
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present and not expired
    /// * `Ok(None)` - Key absent, deleted or expired
    /// * `Err(DomainError)` - Store unavailable
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Store a value and add `key` to every set in `indexes`, atomically.
    ///
    /// Each index's expiry is pushed out to at least `ttl` so an index never
    /// lapses before a member written into it.
    async fn set_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        indexes: &[String],
    ) -> Result<(), DomainError>;

    /// Delete a key and remove it from every set in `indexes`, atomically.
    /// Returns whether the key itself existed.
    async fn delete_indexed(&self, key: &str, indexes: &[String]) -> Result<bool, DomainError>;

    /// Members of an index set; may include keys whose values already expired
    async fn index_members(&self, index: &str) -> Result<Vec<String>, DomainError>;

    /// Publish a message on a channel, returning the number of receivers
    async fn publish(&self, channel: &str, message: &str) -> Result<usize, DomainError>;

    /// Whether a key is present
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }
}
