//! bcrypt implementation of the PasswordVerifier trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::warn;

use ac_core::errors::{DomainError, DomainResult};
use ac_core::services::PasswordVerifier;

/// Plaintext behind the stand-in hash checked for unknown logins
const ABSENT_PASSWORD: &str = "access-core-absent-principal";

/// Verifies bcrypt hashes off the async runtime
#[derive(Debug, Clone, Default)]
pub struct BcryptPasswordVerifier {
    /// Stand-in hash at the default cost, created on first use
    absent_hash: Arc<OnceCell<String>>,
}

impl BcryptPasswordVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    async fn absent_hash(&self) -> DomainResult<&str> {
        let hash = self
            .absent_hash
            .get_or_try_init(|| async {
                let outcome = tokio::task::spawn_blocking(|| bcrypt::hash(ABSENT_PASSWORD, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?;
                outcome.map_err(|e| DomainError::internal(format!("Password hashing failed: {}", e)))
            })
            .await?;
        Ok(hash.as_str())
    }
}

#[async_trait]
impl PasswordVerifier for BcryptPasswordVerifier {
    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                // A corrupt stored hash must not read as a wrong password
                warn!(error = %e, "Stored credential hash is unreadable");
                Err(DomainError::internal("Stored credential hash is unreadable"))
            }
        }
    }

    async fn verify_absent(&self, password: &str) {
        let outcome = match self.absent_hash().await {
            Ok(hash) => self.verify(password, hash).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            warn!(error = %e, "Stand-in password check failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_bcrypt_hash() {
        let hash = bcrypt::hash("s3cret-pass", 4).unwrap();
        let verifier = BcryptPasswordVerifier::new();

        assert!(verifier.verify("s3cret-pass", &hash).await.unwrap());
        assert!(!verifier.verify("wrong-pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_absent_check_reuses_one_stand_in_hash() {
        let verifier = BcryptPasswordVerifier::new();

        verifier.verify_absent("whatever").await;
        let first = verifier.absent_hash.get().cloned().unwrap();
        assert!(first.starts_with("$2"));

        // Clones share the cell, so the hash is made once per verifier
        let clone = verifier.clone();
        clone.verify_absent("something-else").await;
        assert_eq!(clone.absent_hash.get(), Some(&first));
        assert!(verifier.verify(ABSENT_PASSWORD, &first).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_hash_is_an_error() {
        let verifier = BcryptPasswordVerifier::new();

        let result = verifier.verify("anything", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }
}
