//! Session token claims and verification failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{Email, Role, User, UserId};

/// Verified claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Subject: the user id.
    #[schema(value_type = i64)]
    pub sub: UserId,
    /// Login email, unique across accounts.
    #[schema(value_type = String)]
    pub email: Email,
    /// Access role.
    pub role: Role,
    /// Token version the token was issued against.
    pub ver: i32,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// Account the token belongs to.
    pub user_id: UserId,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Access role.
    pub role: Role,
    /// Must match the stored version for the token to stay valid.
    pub token_version: i32,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            token_version: user.token_version,
        }
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Reasons a presented token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a decodable JWS.
    #[error("token is malformed")]
    Malformed,
    /// Signature does not verify against the secret.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// `exp` lies in the past.
    #[error("token has expired")]
    Expired,
    /// A mandatory claim is absent.
    #[error("token is missing a required claim")]
    MissingRequiredClaim,
}

/// Authenticated caller resolved from a verified, current token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account the token belongs to.
    pub user_id: UserId,
    /// Access role.
    pub role: Role,
    /// Raw claims, echoed by `/auth/verify`.
    pub claims: Claims,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            claims,
        }
    }
}
