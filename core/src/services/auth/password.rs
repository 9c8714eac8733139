//! Password verification seam

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Checks a presented password against a stored credential hash
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - Password matches
    /// * `Ok(false)` - Password does not match
    /// * `Err(DomainError)` - Hash is unreadable or verification failed
    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool>;

    /// Spend the cost of one `verify` without a stored hash.
    ///
    /// Called when no principal matched the login, so unknown usernames take
    /// as long to reject as wrong passwords. The default does nothing.
    async fn verify_absent(&self, _password: &str) {}
}
