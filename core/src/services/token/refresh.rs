//! Refresh coordinator: trades a live refresh token for a new access token.
//!
//! Sessions slide: the refresh token is never rotated or consumed here. It
//! stays usable until it expires or its record is revoked, so a leaked
//! refresh token works until logout and reuse is not detected.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{TokenDetails, TokenKind};
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenStore;

use super::clock::Clock;
use super::codec::ClaimsCodec;
use super::records::RefreshRecordStore;

pub struct RefreshCoordinator<S: TokenStore> {
    codec: Arc<ClaimsCodec>,
    records: RefreshRecordStore<S>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
}

impl<S: TokenStore> RefreshCoordinator<S> {
    pub fn new(
        codec: Arc<ClaimsCodec>,
        records: RefreshRecordStore<S>,
        clock: Arc<dyn Clock>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            records,
            clock,
            access_ttl,
        }
    }

    /// Mint a new access token for the session behind `refresh_token`.
    ///
    /// # Errors
    ///
    /// * Codec errors are propagated unchanged
    /// * `TokenError::WrongTokenKind` - An access token was presented
    /// * `TokenError::Revoked` - The refresh record is gone or belongs elsewhere
    /// * `DomainError::StorageFailure` - The record could not be read
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenDetails, DomainError> {
        let claims = self.codec.decode(refresh_token)?;

        if !claims.is_refresh() {
            return Err(TokenError::WrongTokenKind {
                expected: TokenKind::Refresh,
            }
            .into());
        }

        let record = match self.records.find(&claims.token_id).await? {
            Some(record) => record,
            None => {
                debug!(token_id = %claims.token_id, "Refresh rejected, no live record");
                return Err(TokenError::Revoked.into());
            }
        };

        if !record.matches(&claims) {
            warn!(
                token_id = %claims.token_id,
                principal_id = %claims.user_id,
                record_principal_id = %record.user_id,
                "Refresh record does not match token claims"
            );
            return Err(TokenError::Revoked.into());
        }

        let access_claims = claims.to_access(self.clock.now(), self.access_ttl);
        let access_token = self.codec.encode(&access_claims)?;

        debug!(token_id = %claims.token_id, principal_id = %claims.user_id, "Refreshed access token");

        Ok(TokenDetails {
            access_token,
            refresh_token: None,
            token_id: claims.token_id,
            access_expires_at: access_claims.expires_at(),
        })
    }
}
