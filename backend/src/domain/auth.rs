//! Authentication primitives: registration input, login credentials and
//! stored password digests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, UserValidationError, Username};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or does not look like an address.
    InvalidEmail,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Username length is out of range.
    InvalidUsername(UserValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidUsername(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn parse_email(raw: &str) -> Result<Email, CredentialsValidationError> {
    Email::new(raw).map_err(|_| CredentialsValidationError::InvalidEmail)
}

fn parse_password(raw: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised (trimmed and lower-cased).
/// - `password` is at least [`PASSWORD_MIN`] characters and keeps any
///   caller-provided whitespace.
///
/// # Examples
/// ```
/// use storefront::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "secret1").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "secret1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: parse_email(email)?,
            password: parse_password(password)?,
        })
    }

    /// Normalised email used for lookups.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    password: Zeroizing<String>,
    username: Username,
}

impl Registration {
    /// Validate raw sign-up fields, reporting the first failing field.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = parse_email(email)?;
        let password = parse_password(password)?;
        let username =
            Username::new(username).map_err(CredentialsValidationError::InvalidUsername)?;
        Ok(Self {
            email,
            password,
            username,
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password; never logged.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested display name.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// Encoded password digest in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest produced by a hasher or read from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}
