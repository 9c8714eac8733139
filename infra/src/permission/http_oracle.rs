//! HTTP client for the relationship-based permission service.
//!
//! Asks `POST {api_url}/stores/{store_id}/check` whether `user:<principal>`
//! holds a relation on `tenant:<tenant>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use ac_core::errors::DomainError;
use ac_core::services::PermissionOracle;

use super::PermissionConfig;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
pub(crate) struct CheckRequest {
    pub tuple_key: TupleKey,
}

#[derive(Debug, Serialize)]
pub(crate) struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    allowed: bool,
}

impl CheckRequest {
    pub(crate) fn new(principal_id: Uuid, relation: &str, tenant_id: Uuid) -> Self {
        Self {
            tuple_key: TupleKey {
                user: format!("user:{}", principal_id),
                relation: relation.to_string(),
                object: format!("tenant:{}", tenant_id),
            },
        }
    }
}

pub struct HttpPermissionOracle {
    http: reqwest::Client,
    check_url: String,
    api_token: Option<String>,
}

impl HttpPermissionOracle {
    pub fn new(config: &PermissionConfig) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            check_url: config.check_url(),
            api_token: config.api_token.clone(),
        })
    }

    async fn send(&self, request: &CheckRequest) -> Result<bool, InfrastructureError> {
        let mut builder = self.http.post(&self.check_url).json(request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?.error_for_status()?;
        let body: CheckResponse = response.json().await?;
        Ok(body.allowed)
    }
}

#[async_trait]
impl PermissionOracle for HttpPermissionOracle {
    async fn check(&self, principal_id: Uuid, relation: &str, tenant_id: Uuid) -> Result<bool, DomainError> {
        let request = CheckRequest::new(principal_id, relation, tenant_id);

        match self.send(&request).await {
            Ok(allowed) => {
                debug!(principal_id = %principal_id, tenant_id = %tenant_id, relation, allowed, "Permission checked");
                Ok(allowed)
            }
            Err(e) => {
                error!(relation, error = %e, "Permission check failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(api_url: String) -> PermissionConfig {
        PermissionConfig {
            api_url,
            store_id: "store-1".to_string(),
            api_token: Some("oracle-token".to_string()),
            timeout_ms: 2000,
        }
    }

    #[test]
    fn test_check_request_shape() {
        let principal = Uuid::nil();
        let tenant = Uuid::from_u128(1);
        let body = serde_json::to_value(CheckRequest::new(principal, "can_manage_sessions", tenant)).unwrap();

        assert_eq!(
            body,
            json!({
                "tuple_key": {
                    "user": format!("user:{}", principal),
                    "relation": "can_manage_sessions",
                    "object": format!("tenant:{}", tenant),
                }
            })
        );
    }

    #[tokio::test]
    async fn test_oracle_reads_allowed_flag() {
        let mut server = mockito::Server::new_async().await;
        let principal = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mock = server
            .mock("POST", "/stores/store-1/check")
            .match_header("authorization", "Bearer oracle-token")
            .match_body(Matcher::PartialJson(json!({
                "tuple_key": { "relation": "can_manage_sessions" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"allowed":true}"#)
            .create_async()
            .await;

        let oracle = HttpPermissionOracle::new(&config(server.url())).unwrap();
        assert!(oracle.check(principal, "can_manage_sessions", tenant).await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_oracle_error_status_is_a_storage_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/stores/store-1/check")
            .with_status(500)
            .create_async()
            .await;

        let oracle = HttpPermissionOracle::new(&config(server.url())).unwrap();
        let result = oracle.check(Uuid::new_v4(), "can_manage_sessions", Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::StorageFailure { .. })));
    }
}
