//! Session lifecycle events published on the token store's pub/sub channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::repositories::TokenStore;

use super::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    Issued,
    Logout,
    PrincipalRevoked,
    TenantRevoked,
}

/// Wire form of a session event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub event: SessionEventKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Principal or tenant the event applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Uuid>,

    /// Sessions affected by a bulk revoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    pub at: DateTime<Utc>,
}

impl SessionEvent {
    pub fn issued(token_id: &str, principal_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            event: SessionEventKind::Issued,
            token_id: Some(token_id.to_string()),
            scope: Some(principal_id),
            count: None,
            at,
        }
    }

    pub fn logout(token_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            event: SessionEventKind::Logout,
            token_id: Some(token_id.to_string()),
            scope: None,
            count: None,
            at,
        }
    }

    pub fn bulk(kind: SessionEventKind, scope: Uuid, count: usize, at: DateTime<Utc>) -> Self {
        Self {
            event: kind,
            token_id: None,
            scope: Some(scope),
            count: Some(count),
            at,
        }
    }
}

/// Best-effort publisher: failures are logged and never reach the caller
pub struct SessionEventPublisher<S: TokenStore> {
    store: Arc<S>,
    channel: String,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl<S: TokenStore> SessionEventPublisher<S> {
    pub fn new(store: Arc<S>, channel: impl Into<String>, clock: Arc<dyn Clock>, deadline: Duration) -> Self {
        Self {
            store,
            channel: channel.into(),
            clock,
            deadline,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn publish(&self, event: SessionEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize session event");
                return;
            }
        };

        match timeout(self.deadline, self.store.publish(&self.channel, &payload)).await {
            Ok(Ok(receivers)) => {
                debug!(channel = %self.channel, event = ?event.event, receivers, "Published session event");
            }
            Ok(Err(e)) => {
                warn!(channel = %self.channel, error = %e, "Failed to publish session event");
            }
            Err(_) => {
                warn!(channel = %self.channel, "Publishing session event exceeded its deadline");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let at = Utc::now();
        let event = SessionEvent::bulk(SessionEventKind::TenantRevoked, Uuid::nil(), 3, at);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "tenant_revoked");
        assert_eq!(json["count"], 3);
        assert!(json.get("token_id").is_none());

        let parsed: SessionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
