//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{
    Email, Money, PasswordHash, ProfileChanges, Role, SignupCounts, StatsWindow, User, UserId,
    Username,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email is already registered to another account.
        DuplicateEmail => "email already registered",
        /// The username is already taken by another account.
        DuplicateUsername => "username already taken",
    }
}

/// Row to insert when an account is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login email, unique across accounts.
    pub email: Email,
    /// Display name.
    pub username: Username,
    /// Stored password digest.
    pub password_hash: PasswordHash,
    /// Access role.
    pub role: Role,
    /// Opening balance.
    pub balance: Money,
}

/// A user together with the stored password digest, for login only.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredentials {
    /// The account.
    pub user: User,
    /// Stored password digest.
    pub password_hash: PasswordHash,
}

/// Driven port for account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return it with its assigned id.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password digest by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Current token version, or `None` when the user no longer exists.
    async fn token_version(&self, id: UserId) -> Result<Option<i32>, UserPersistenceError>;

    /// Apply the present fields of `changes`; `None` when the user is missing.
    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace the avatar URL; `false` when the user is missing.
    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<bool, UserPersistenceError>;

    /// Increment the token version, revoking outstanding tokens.
    async fn bump_token_version(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Change the role and bump the token version in one statement.
    async fn set_role(&self, id: UserId, role: Role)
    -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user; `false` when the user is missing.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Every user, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Count accounts overall and by creation time within `window`.
    async fn signup_counts(
        &self,
        window: StatsWindow,
    ) -> Result<SignupCounts, UserPersistenceError>;
}
