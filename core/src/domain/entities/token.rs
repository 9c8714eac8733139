//! Token entities: signed claims, the refresh record kept in the token store,
//! and the payload handed back after issuance or refresh.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};
use super::tenant::{Tenant, TenantGroup};

/// Which side of a session a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, authorizes API calls
    Access,
    /// Long-lived, only mints new access tokens
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub user_id: Uuid,

    /// Login handle
    pub username: String,

    pub tenant_id: Uuid,

    /// Denormalized at mint time; not re-verified on decode
    pub tenant_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    pub role: Role,

    /// `true` for refresh tokens, `false` for access tokens
    pub renew: bool,

    /// Session identity shared by an access/refresh pair
    pub token_id: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expires at (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for one side of a session.
    ///
    /// `issued_at` is provisional: the codec re-stamps it when signing.
    pub fn for_session(
        principal: &Principal,
        tenant: &Tenant,
        group: Option<&TenantGroup>,
        token_id: &str,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: principal.id,
            username: principal.username.clone(),
            tenant_id: tenant.id,
            tenant_name: tenant.name.clone(),
            group_id: group.map(|g| g.id),
            group_name: group.map(|g| g.name.clone()),
            role: principal.role,
            renew: kind == TokenKind::Refresh,
            token_id: token_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        if self.renew {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }

    pub fn is_access(&self) -> bool {
        !self.renew
    }

    pub fn is_refresh(&self) -> bool {
        self.renew
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.iat)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// A token is invalid once the current time exceeds its expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Access claims derived from these claims, keeping the session identity
    pub fn to_access(&self, issued_at: DateTime<Utc>, access_ttl: Duration) -> Self {
        Self {
            renew: false,
            iat: issued_at.timestamp(),
            exp: (issued_at + access_ttl).timestamp(),
            ..self.clone()
        }
    }
}

/// Store-side proof that a refresh token is still live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub user_id: Uuid,
    pub username: String,
    pub tenant_id: Uuid,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshRecord {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username.clone(),
            tenant_id: claims.tenant_id,
            role: claims.role,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        }
    }

    /// Whether the record was written for the session these claims describe
    pub fn matches(&self, claims: &Claims) -> bool {
        self.user_id == claims.user_id && self.tenant_id == claims.tenant_id
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left before the record lapses; may be zero or negative
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// Tokens produced by issuance or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub access_token: String,

    /// Present only on issuance; refresh never reissues it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub token_id: String,

    /// Expiry of the access token
    pub access_expires_at: DateTime<Utc>,
}

fn timestamp_to_datetime(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
