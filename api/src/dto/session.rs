use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ac_core::domain::entities::Role;
use ac_core::services::SessionContext;

/// Caller identity as seen by the gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub principal_id: Uuid,
    pub username: String,
    pub role: Role,
    pub tenant_id: Uuid,
    pub tenant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub token_id: String,
}

impl From<&SessionContext> for SessionResponse {
    fn from(session: &SessionContext) -> Self {
        let claims = session.claims();
        Self {
            principal_id: claims.user_id,
            username: claims.username.clone(),
            role: claims.role,
            tenant_id: session.tenant().tenant_id(),
            tenant_name: claims.tenant_name.clone(),
            group_id: claims.group_id,
            group_name: claims.group_name.clone(),
            token_id: claims.token_id.clone(),
        }
    }
}

/// Number of sessions a bulk revoke removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionCheckRequest {
    #[validate(length(min = 1, max = 128))]
    pub relation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}
