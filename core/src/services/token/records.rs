//! Refresh record persistence on top of a [`TokenStore`].
//!
//! Keys:
//! - `refresh:<token_id>` holds the JSON record
//! - `refresh:principal:<principal_id>` indexes a principal's live record keys
//! - `refresh:tenant:<tenant_id>` indexes a tenant's live record keys

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::time::timeout;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::entities::RefreshRecord;
use crate::errors::DomainError;
use crate::repositories::TokenStore;

use super::clock::Clock;

const RECORD_PREFIX: &str = "refresh:";

pub fn record_key(token_id: &str) -> String {
    format!("{}{}", RECORD_PREFIX, token_id)
}

pub fn principal_index_key(principal_id: Uuid) -> String {
    format!("{}principal:{}", RECORD_PREFIX, principal_id)
}

pub fn tenant_index_key(tenant_id: Uuid) -> String {
    format!("{}tenant:{}", RECORD_PREFIX, tenant_id)
}

fn token_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(RECORD_PREFIX)
}

fn indexes_for(record: &RefreshRecord) -> Vec<String> {
    vec![
        principal_index_key(record.user_id),
        tenant_index_key(record.tenant_id),
    ]
}

/// Typed access to refresh records with a deadline on every store call
pub struct RefreshRecordStore<S: TokenStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl<S: TokenStore> Clone for RefreshRecordStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            deadline: self.deadline,
        }
    }
}

impl<S: TokenStore> RefreshRecordStore<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, deadline: Duration) -> Self {
        Self {
            store,
            clock,
            deadline,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist a record with a TTL equal to its remaining lifetime and
    /// register it in the principal and tenant indexes.
    ///
    /// A non-positive remaining lifetime is a `Configuration` error and
    /// nothing is written.
    pub async fn save(&self, token_id: &str, record: &RefreshRecord) -> Result<(), DomainError> {
        let ttl = record.remaining_ttl(self.clock.now());
        if ttl <= ChronoDuration::zero() {
            error!(token_id, ttl_seconds = ttl.num_seconds(), "Refusing to store refresh record without positive TTL");
            return Err(DomainError::configuration("refresh record TTL must be positive"));
        }
        let ttl = ttl
            .to_std()
            .map_err(|_| DomainError::configuration("refresh record TTL out of range"))?;

        let value = serde_json::to_string(record)
            .map_err(|e| DomainError::internal(format!("failed to serialize refresh record: {}", e)))?;
        let key = record_key(token_id);
        let indexes = indexes_for(record);

        self.bounded("save", self.store.set_indexed(&key, &value, ttl, &indexes))
            .await?;
        debug!(token_id, ttl_seconds = ttl.as_secs(), "Stored refresh record");
        Ok(())
    }

    /// Load a live record.
    ///
    /// Absent, deleted and lapsed records all read as `None`.
    pub async fn find(&self, token_id: &str) -> Result<Option<RefreshRecord>, DomainError> {
        let record = match self.load(token_id).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        if record.is_expired_at(self.clock.now()) {
            debug!(token_id, "Refresh record past its expiry, treating as absent");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Delete a record and its index entries. Returns whether a record was removed.
    pub async fn remove(&self, token_id: &str) -> Result<bool, DomainError> {
        let key = record_key(token_id);
        let indexes = match self.load(token_id).await {
            Ok(Some(record)) => indexes_for(&record),
            Ok(None) => return Ok(false),
            // Unreadable record: still delete the key itself
            Err(DomainError::Internal { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        self.bounded("remove", self.store.delete_indexed(&key, &indexes))
            .await
    }

    /// Delete every record listed in `index`, pruning stale members.
    /// Returns the number of records actually removed.
    pub async fn remove_indexed(&self, index: &str) -> Result<usize, DomainError> {
        let members = self
            .bounded("index_members", self.store.index_members(index))
            .await?;

        let mut removed = 0;
        for key in &members {
            let token_id = match token_id_from_key(key) {
                Some(token_id) => token_id,
                None => {
                    warn!(index, key = %key, "Ignoring foreign key in refresh index");
                    continue;
                }
            };

            if self.remove(token_id).await? {
                removed += 1;
            } else {
                // Record lapsed on its own; drop the dangling member
                let index = vec![index.to_string()];
                self.bounded("prune", self.store.delete_indexed(key, &index))
                    .await?;
            }
        }

        debug!(index, listed = members.len(), removed, "Removed indexed refresh records");
        Ok(removed)
    }

    async fn load(&self, token_id: &str) -> Result<Option<RefreshRecord>, DomainError> {
        let key = record_key(token_id);
        let raw = match self.bounded("get", self.store.get(&key)).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            error!(token_id, error = %e, "Unreadable refresh record");
            DomainError::internal(format!("unreadable refresh record: {}", e))
        })
    }

    /// Run a store call under the configured deadline
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match timeout(self.deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "Token store call failed");
                Err(e)
            }
            Err(_) => {
                error!(operation, deadline_ms = self.deadline.as_millis() as u64, "Token store call exceeded its deadline");
                Err(DomainError::storage(format!(
                    "token store {} exceeded {}ms deadline",
                    operation,
                    self.deadline.as_millis()
                )))
            }
        }
    }
}
