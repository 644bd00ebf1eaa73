//! Driving port resolving a bearer token into an authenticated principal.

use async_trait::async_trait;

use crate::domain::{Error, Principal};

/// Resolves bearer tokens into principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Verify the token and confirm it has not been revoked.
    ///
    /// Every failure is `Unauthorized`.
    async fn authenticate(&self, token: &str) -> Result<Principal, Error>;
}
