//! In-process token store.
//!
//! Used by tests and by single-instance local runs. Expiry follows the
//! injected clock, so simulated time also expires stored records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

use crate::errors::DomainError;
use crate::services::token::clock::{Clock, SystemClock};

use super::r#trait::TokenStore;

/// Message delivered to in-process subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub channel: String,
    pub payload: String,
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct IndexEntry {
    members: HashSet<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, Entry>,
    indexes: HashMap<String, IndexEntry>,
}

impl MemoryState {
    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.values.retain(|_, entry| entry.expires_at > now);
        self.indexes.retain(|_, index| index.expires_at > now);
    }
}

/// Token store kept in process memory
pub struct MemoryTokenStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
    channel: broadcast::Sender<PublishedMessage>,
}

impl MemoryTokenStore {
    /// Create a store on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (channel, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
            unavailable: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
            channel,
        }
    }

    /// Make every subsequent call fail with `StorageFailure` until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every call, to exercise caller deadlines
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Receive messages published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.channel.subscribe()
    }

    /// Number of live keys, indexes excluded
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        state.purge_expired(now);
        state.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn enter(&self) -> Result<(), DomainError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::storage("memory token store marked unavailable"));
        }
        Ok(())
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>, DomainError> {
        if ttl.is_zero() {
            return Err(DomainError::configuration("token store TTL must be positive"));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| DomainError::configuration("token store TTL out of range"))?;
        Ok(self.clock.now() + ttl)
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.enter().await?;
        let expires_at = self.expiry(ttl)?;

        let mut state = self.state.lock().await;
        state.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.enter().await?;
        let now = self.clock.now();

        let mut state = self.state.lock().await;
        state.purge_expired(now);
        Ok(state.values.get(key).map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.enter().await?;
        let now = self.clock.now();

        let mut state = self.state.lock().await;
        state.purge_expired(now);
        Ok(state.values.remove(key).is_some())
    }

    async fn set_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        indexes: &[String],
    ) -> Result<(), DomainError> {
        self.enter().await?;
        let expires_at = self.expiry(ttl)?;
        let now = self.clock.now();

        // One lock covers the record and every index
        let mut state = self.state.lock().await;
        state.purge_expired(now);
        state.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        for index in indexes {
            let entry = state
                .indexes
                .entry(index.clone())
                .or_insert_with(|| IndexEntry {
                    members: HashSet::new(),
                    expires_at,
                });
            entry.members.insert(key.to_string());
            if entry.expires_at < expires_at {
                entry.expires_at = expires_at;
            }
        }
        Ok(())
    }

    async fn delete_indexed(&self, key: &str, indexes: &[String]) -> Result<bool, DomainError> {
        self.enter().await?;
        let now = self.clock.now();

        let mut state = self.state.lock().await;
        state.purge_expired(now);
        let existed = state.values.remove(key).is_some();
        for index in indexes {
            let emptied = match state.indexes.get_mut(index) {
                Some(entry) => {
                    entry.members.remove(key);
                    entry.members.is_empty()
                }
                None => false,
            };
            if emptied {
                state.indexes.remove(index);
            }
        }
        Ok(existed)
    }

    async fn index_members(&self, index: &str) -> Result<Vec<String>, DomainError> {
        self.enter().await?;
        let now = self.clock.now();

        let mut state = self.state.lock().await;
        state.purge_expired(now);
        let mut members: Vec<String> = state
            .indexes
            .get(index)
            .map(|entry| entry.members.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        Ok(members)
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, DomainError> {
        self.enter().await?;
        let delivered = self
            .channel
            .send(PublishedMessage {
                channel: channel.to_string(),
                payload: message.to_string(),
            })
            .unwrap_or(0);
        Ok(delivered)
    }
}
