//! Partial profile updates.
//!
//! Inbound JSON deserialises straight into [`ProfileUpdate`]; unknown keys are
//! rejected by serde. [`ProfileUpdate::validate`] then turns it into a
//! [`ProfileChanges`] set with trimmed, length-checked values. Absent (or
//! `null`) fields leave the stored value untouched.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{UserValidationError, Username};

/// Character limit for `full_name`.
pub const FULL_NAME_MAX: usize = 100;
/// Character limit for `phone`.
pub const PHONE_MAX: usize = 32;
/// Character limit for `bio`.
pub const BIO_MAX: usize = 1000;
/// Character limit for `country`.
pub const COUNTRY_MAX: usize = 100;
/// Character limit for `city`.
pub const CITY_MAX: usize = 100;
/// Character limit for `avatar_url`.
pub const AVATAR_URL_MAX: usize = 500;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^[\d\s\-+()]+$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Validation failures for profile payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// The requested username is invalid.
    Username(UserValidationError),
    /// Phone contains characters other than digits, spaces, `+`, `-` and parentheses.
    InvalidPhone,
    /// Birth date is not a `YYYY-MM-DD` date.
    InvalidBirthDate,
    /// Birth date lies after today.
    BirthDateInFuture,
    /// A text field exceeds its character limit.
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Its limit.
        max: usize,
    },
    /// Avatar URL is blank.
    EmptyAvatarUrl,
}

impl ProfileValidationError {
    /// Name of the offending JSON field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::InvalidPhone => "phone",
            Self::InvalidBirthDate | Self::BirthDateInFuture => "birth_date",
            Self::TooLong { field, .. } => *field,
            Self::EmptyAvatarUrl => "avatar_url",
        }
    }

    /// Machine-readable detail code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Username(_) => "invalid_username",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidBirthDate => "invalid_date",
            Self::BirthDateInFuture => "date_in_future",
            Self::TooLong { .. } => "too_long",
            Self::EmptyAvatarUrl => "missing_field",
        }
    }
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(inner) => write!(f, "{inner}"),
            Self::InvalidPhone => write!(f, "phone number contains invalid characters"),
            Self::InvalidBirthDate => write!(f, "birth_date must be an ISO date (YYYY-MM-DD)"),
            Self::BirthDateInFuture => write!(f, "birth_date must not be in the future"),
            Self::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::EmptyAvatarUrl => write!(f, "avatar_url is required"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Request body for `PUT /api/auth/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// ISO-8601 calendar date.
    #[serde(default)]
    #[schema(example = "1990-04-12")]
    pub birth_date: Option<String>,
}

/// Validated profile changes ready for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// Display name.
    pub username: Option<Username>,
    /// Full name.
    pub full_name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
}

fn bounded_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ProfileValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.chars().count() > max {
                return Err(ProfileValidationError::TooLong { field, max });
            }
            Ok(Some(trimmed.to_owned()))
        }
    }
}

impl ProfileUpdate {
    /// Validate the payload against `today` (the caller's clock).
    pub fn validate(self, today: NaiveDate) -> Result<ProfileChanges, ProfileValidationError> {
        let username = self
            .username
            .map(Username::new)
            .transpose()
            .map_err(ProfileValidationError::Username)?;

        let phone = match self.phone {
            Some(raw) => {
                let trimmed = raw.trim();
                if !phone_regex().is_match(trimmed) {
                    return Err(ProfileValidationError::InvalidPhone);
                }
                if trimmed.chars().count() > PHONE_MAX {
                    return Err(ProfileValidationError::TooLong {
                        field: "phone",
                        max: PHONE_MAX,
                    });
                }
                Some(trimmed.to_owned())
            }
            None => None,
        };

        let birth_date = match self.birth_date {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ProfileValidationError::InvalidBirthDate)?;
                if date > today {
                    return Err(ProfileValidationError::BirthDateInFuture);
                }
                Some(date)
            }
            None => None,
        };

        Ok(ProfileChanges {
            username,
            full_name: bounded_text(self.full_name, "full_name", FULL_NAME_MAX)?,
            phone,
            bio: bounded_text(self.bio, "bio", BIO_MAX)?,
            country: bounded_text(self.country, "country", COUNTRY_MAX)?,
            city: bounded_text(self.city, "city", CITY_MAX)?,
            birth_date,
        })
    }
}

/// Validate an avatar URL: non-empty after trimming, bounded length.
pub fn validate_avatar_url(raw: &str) -> Result<String, ProfileValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileValidationError::EmptyAvatarUrl);
    }
    if trimmed.chars().count() > AVATAR_URL_MAX {
        return Err(ProfileValidationError::TooLong {
            field: "avatar_url",
            max: AVATAR_URL_MAX,
        });
    }
    Ok(trimmed.to_owned())
}
