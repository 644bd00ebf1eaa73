//! Driving port for account self-service: sign-up, login, profile edits and
//! logout.
//!
//! Inbound adapters call it without knowing the backing infrastructure, so
//! handler tests can substitute a double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{
    Error, IssuedToken, LoginCredentials, ProfileUpdate, Registration, User, UserId,
};

/// Token and account returned by sign-up and login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// Signed token for the session.
    pub token: IssuedToken,
    /// The account.
    pub user: User,
}

/// Driving port for registration, login and profile writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account with the default role and starting balance.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Apply a partial profile update.
    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Replace the avatar URL and return the stored value.
    async fn update_avatar(&self, user_id: UserId, avatar_url: String) -> Result<String, Error>;

    /// Revoke every outstanding token for the user.
    async fn logout(&self, user_id: UserId) -> Result<(), Error>;
}
