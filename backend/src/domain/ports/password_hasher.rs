//! Port for password digest creation and verification.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a password digest.
    pub enum PasswordHashError {
        /// The digest could not be produced or parsed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Digest creation and verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest of `plaintext`.
    async fn hash(&self, plaintext: Zeroizing<String>) -> Result<PasswordHash, PasswordHashError>;

    /// Check `plaintext` against `digest`.
    ///
    /// With `digest = None` the adapter still performs a full verification
    /// against an internal dummy digest and returns `false`, so callers can
    /// keep the cost of unknown-account logins equal to wrong-password ones.
    /// Unparseable digests also yield `false`.
    async fn verify(&self, plaintext: Zeroizing<String>, digest: Option<PasswordHash>) -> bool;
}
