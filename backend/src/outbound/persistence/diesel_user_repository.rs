//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Emails and usernames are unique through `users_email_key` and
//! `users_username_key`; violations of either surface as the matching
//! duplicate error rather than a generic query failure.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{NewUser, StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{
    Email, Money, PasswordHash, ProfileChanges, Role, SignupCounts, StatsWindow, User, UserId,
    UserProfile, Username,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, ProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_INDEX: &str = "users_email_key";
const USERNAME_INDEX: &str = "users_username_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection => UserPersistenceError::connection("database connection error"),
        DieselFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some(EMAIL_INDEX) => UserPersistenceError::duplicate_email(),
            Some(USERNAME_INDEX) => UserPersistenceError::duplicate_username(),
            _ => UserPersistenceError::query("unique constraint violated"),
        },
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn corrupt_row(id: i64, column: &'static str) -> UserPersistenceError {
    warn!(user_id = id, column, "stored user row failed validation");
    UserPersistenceError::query(format!("stored user {id} has an invalid {column}"))
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = UserId::new(row.id).map_err(|_| corrupt_row(row.id, "id"))?;
    let email = Email::new(&row.email).map_err(|_| corrupt_row(row.id, "email"))?;
    let username = Username::new(&row.username).map_err(|_| corrupt_row(row.id, "username"))?;
    let role: Role = row.role.parse().map_err(|_| corrupt_row(row.id, "role"))?;
    let balance = Money::try_from_decimal(row.balance).map_err(|_| corrupt_row(row.id, "balance"))?;

    Ok(User {
        id,
        email,
        username,
        role,
        balance,
        profile: UserProfile {
            avatar_url: row.avatar_url,
            full_name: row.full_name,
            phone: row.phone,
            bio: row.bio,
            country: row.country,
            city: row.city,
            birth_date: row.birth_date,
        },
        token_version: row.token_version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_credentials(row: UserRow) -> Result<StoredCredentials, UserPersistenceError> {
    let password_hash = PasswordHash::new(row.password.clone());
    Ok(StoredCredentials {
        user: row_to_user(row)?,
        password_hash,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            email: user.email.as_ref(),
            password: user.password_hash.as_str(),
            username: user.username.as_ref(),
            role: user.role.as_str(),
            balance: user.balance.as_decimal(),
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn token_version(&self, id: UserId) -> Result<Option<i32>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.get())
            .select(users::token_version)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ProfileChangeset {
            username: changes.username.as_ref().map(AsRef::as_ref),
            full_name: changes.full_name.as_deref(),
            phone: changes.phone.as_deref(),
            bio: changes.bio.as_deref(),
            country: changes.country.as_deref(),
            city: changes.city.as_deref(),
            birth_date: changes.birth_date,
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set((&changeset, users::updated_at.eq(now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set((
                users::avatar_url.eq(Some(avatar_url)),
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn bump_token_version(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(users::token_version.eq(users::token_version + 1))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn set_role(
        &self,
        id: UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set((
                users::role.eq(role.as_str()),
                users::token_version.eq(users::token_version + 1),
                users::updated_at.eq(now),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted == 1)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn signup_counts(
        &self,
        window: StatsWindow,
    ) -> Result<SignupCounts, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let recent: i64 = users::table
            .filter(users::created_at.ge(window.active_since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let today: i64 = users::table
            .filter(users::created_at.ge(window.today_start))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(SignupCounts {
            total,
            recent,
            today,
        })
    }
}
