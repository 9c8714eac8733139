//! Claims codec: signs claims into compact JWTs and verifies them back.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::domain::entities::Claims;
use crate::errors::{DomainError, TokenError};

use super::clock::Clock;

/// HS256 codec bound to one secret.
///
/// Stateless apart from the keys; safe to share across any number of tasks.
pub struct ClaimsCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl ClaimsCodec {
    /// Creates a codec for `secret`
    ///
    /// # Errors
    ///
    /// `DomainError::Configuration` if the secret is empty
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        })
    }

    /// Signs `claims`, stamping `iat` with the current time.
    ///
    /// The caller's `exp` is kept as given and must lie after the stamp.
    pub fn encode(&self, claims: &Claims) -> Result<String, DomainError> {
        let mut stamped = claims.clone();
        stamped.iat = self.clock.now().timestamp();

        if stamped.exp <= stamped.iat {
            return Err(DomainError::configuration(format!(
                "token expiry {} is not after issue time {}",
                stamped.exp, stamped.iat
            )));
        }

        encode(&self.header, &stamped, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {}", e)))
    }

    /// Verifies a token and returns its claims
    ///
    /// # Errors
    ///
    /// * `TokenError::SignatureInvalid` - Signature or algorithm mismatch
    /// * `TokenError::Malformed` - Not a JWT, or claims do not parse
    /// * `TokenError::Expired` - Current time is past `exp`
    pub fn decode(&self, token: &str) -> Result<Claims, DomainError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| DomainError::Token(classify(e.kind())))?;
        let claims = data.claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }

        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
