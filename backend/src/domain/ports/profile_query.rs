//! Driving port for reading the caller's own account.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Driving port for the caller's own account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Fetch the account, or `NotFound` when it no longer exists.
    async fn profile(&self, user_id: UserId) -> Result<User, Error>;
}
