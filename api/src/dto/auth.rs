use serde::{Deserialize, Serialize};
use validator::Validate;

use ac_core::domain::entities::{Claims, TokenDetails};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Tokens handed to the client; `token_type` tells it how to present them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_id: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn from_details(details: TokenDetails, expires_in: i64) -> Self {
        Self {
            access_token: details.access_token,
            refresh_token: details.refresh_token,
            token_id: details.token_id,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub claims: Claims,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}
