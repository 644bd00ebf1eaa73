//! Account self-service: registration, login, profile and logout.
//!
//! Unknown emails and wrong passwords are indistinguishable to callers: both
//! return the same `Unauthorized` message, and both pay for one full password
//! verification.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::port_error_mapping::{
    map_password_hash_error, map_token_issue_error, map_user_persistence_error,
};
use crate::domain::ports::{
    AccountCommand, AuthSession, NewUser, PasswordHasher, ProfileQuery, StoredCredentials,
    TokenService, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, Money, ProfileUpdate, ProfileValidationError, Registration, Role,
    TokenSubject, User, UserId, validate_avatar_url,
};

/// Credit granted to every new account, in minor units.
pub const STARTING_BALANCE_MINOR: i64 = 100_000;

const INVALID_CREDENTIALS: &str = "invalid email or password";

fn map_profile_validation_error(error: ProfileValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

fn user_not_found() -> Error {
    Error::not_found("user not found")
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<R, H, T> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<R, H, T> AccountService<R, H, T> {
    /// Create a new service.
    ///
    /// `clock` decides what "today" means for birth date validation.
    pub fn new(users: Arc<R>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<R, H, T> AccountService<R, H, T>
where
    T: TokenService,
{
    fn open_session(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(&TokenSubject::from(&user))
            .map_err(map_token_issue_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<R, H, T> AccountCommand for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let password_hash = self
            .hasher
            .hash(Zeroizing::new(registration.password().to_owned()))
            .await
            .map_err(map_password_hash_error)?;

        let new_user = NewUser {
            email: registration.email().clone(),
            username: registration.username().clone(),
            password_hash,
            role: Role::User,
            balance: Money::from_minor(STARTING_BALANCE_MINOR),
        };
        let user = self
            .users
            .create(&new_user)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user.id, "account registered");
        self.open_session(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let stored = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?;
        let plaintext = Zeroizing::new(credentials.password().to_owned());

        let Some(StoredCredentials {
            user,
            password_hash,
        }) = stored
        else {
            self.hasher.verify(plaintext, None).await;
            warn!("login rejected: unknown account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(plaintext, Some(password_hash)).await {
            warn!(user_id = %user.id, "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "login succeeded");
        self.open_session(user)
    }

    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error> {
        let today = self.clock.utc().date_naive();
        let changes = update
            .validate(today)
            .map_err(map_profile_validation_error)?;
        self.users
            .update_profile(user_id, &changes)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(user_not_found)
    }

    async fn update_avatar(&self, user_id: UserId, avatar_url: String) -> Result<String, Error> {
        let avatar_url = validate_avatar_url(&avatar_url).map_err(map_profile_validation_error)?;
        let updated = self
            .users
            .update_avatar(user_id, &avatar_url)
            .await
            .map_err(map_user_persistence_error)?;
        if !updated {
            return Err(user_not_found());
        }
        Ok(avatar_url)
    }

    async fn logout(&self, user_id: UserId) -> Result<(), Error> {
        let bumped = self
            .users
            .bump_token_version(user_id)
            .await
            .map_err(map_user_persistence_error)?;
        if !bumped {
            return Err(user_not_found());
        }
        info!(%user_id, "tokens revoked on logout");
        Ok(())
    }
}

#[async_trait]
impl<R, H, T> ProfileQuery for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(user_not_found)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
