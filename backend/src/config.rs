//! Environment-driven application settings.
//!
//! Every variable is read through [`mockable::Env`] so parsing can be tested
//! without touching the process environment. Required values are required in
//! every build mode. [`BuildMode`] only decides whether an unparsable optional
//! value falls back to its default (debug) or aborts start-up (release).

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use mockable::Env;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

use crate::middleware::DEFAULT_REQUEST_TIMEOUT;

pub(crate) const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub(crate) const PORT_ENV: &str = "PORT";
pub(crate) const BIND_HOST_ENV: &str = "BIND_HOST";
pub(crate) const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub(crate) const JWT_SECRET_FILE_ENV: &str = "JWT_SECRET_FILE";
pub(crate) const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";
pub(crate) const REQUEST_TIMEOUT_SECS_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub(crate) const DB_MAX_CONNECTIONS_ENV: &str = "DB_MAX_CONNECTIONS";

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const TOKEN_TTL_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=720;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Minimum signing secret length in bytes.
pub const JWT_SECRET_MIN_LEN: usize = 32;

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to defaults for unparsable optional values.
    Debug,
    /// Release builds reject unparsable optional values.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use storefront::config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value as read.
        value: String,
        /// Description of the accepted format.
        expected: &'static str,
    },
    /// Reading the signing secret file failed.
    #[error("failed to read signing secret at {path}: {source}")]
    SecretRead {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The signing secret is shorter than [`JWT_SECRET_MIN_LEN`].
    #[error("signing secret from {origin} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        /// Where the secret came from.
        origin: &'static str,
        /// Actual length in bytes.
        length: usize,
        /// Required length in bytes.
        min_len: usize,
    },
}

/// Validated process settings.
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Interface the listener binds to.
    pub bind_host: String,
    /// Listener port.
    pub port: u16,
    /// HS256 signing secret; wiped on drop.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// Lifetime of issued tokens.
    pub token_ttl: TimeDelta,
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// Upper bound on pooled connections.
    pub db_max_connections: u32,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("token_ttl", &self.token_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("db_max_connections", &self.db_max_connections)
            .finish_non_exhaustive()
    }
}

impl AppSettings {
    /// Address the HTTP listener binds to.
    #[must_use]
    pub fn bind_addr(&self) -> (String, u16) {
        (self.bind_host.clone(), self.port)
    }
}

/// Build settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use storefront::config::{BuildMode, settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "DATABASE_URL" => Some("postgres://localhost/storefront".to_owned()),
///     "PORT" => Some("8080".to_owned()),
///     "JWT_SECRET" => Some("x".repeat(32)),
///     _ => None,
/// });
///
/// let settings = settings_from_env(&env, BuildMode::Release).unwrap();
/// assert_eq!(settings.bind_addr(), ("0.0.0.0".to_owned(), 8080));
/// assert_eq!(settings.token_ttl.num_hours(), 24);
/// ```
pub fn settings_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<AppSettings, ConfigError> {
    let database_url = required(env, DATABASE_URL_ENV)?;
    let port_raw = required(env, PORT_ENV)?;
    let port = port_raw
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidEnv {
            name: PORT_ENV,
            value: port_raw.clone(),
            expected: "a TCP port (0-65535)",
        })?;
    let bind_host = env
        .string(BIND_HOST_ENV)
        .map(|host| host.trim().to_owned())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_HOST.to_owned());
    let jwt_secret = jwt_secret_from_env(env)?;

    let ttl_hours = optional(
        env,
        mode,
        OptionalVar {
            name: TOKEN_TTL_HOURS_ENV,
            expected: "whole hours between 1 and 720",
            default: DEFAULT_TOKEN_TTL_HOURS,
        },
        |raw| {
            raw.parse::<i64>()
                .ok()
                .filter(|hours| TOKEN_TTL_HOURS_RANGE.contains(hours))
        },
    )?;
    let timeout_secs = optional(
        env,
        mode,
        OptionalVar {
            name: REQUEST_TIMEOUT_SECS_ENV,
            expected: "a positive number of seconds",
            default: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        },
        |raw| raw.parse::<u64>().ok().filter(|secs| *secs > 0),
    )?;
    let db_max_connections = optional(
        env,
        mode,
        OptionalVar {
            name: DB_MAX_CONNECTIONS_ENV,
            expected: "a positive connection count",
            default: DEFAULT_DB_MAX_CONNECTIONS,
        },
        |raw| raw.parse::<u32>().ok().filter(|count| *count > 0),
    )?;

    Ok(AppSettings {
        database_url,
        bind_host,
        port,
        jwt_secret,
        token_ttl: TimeDelta::hours(ttl_hours),
        request_timeout: Duration::from_secs(timeout_secs),
        db_max_connections,
    })
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    env.string(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingEnv { name })
}

struct OptionalVar<T> {
    name: &'static str,
    expected: &'static str,
    default: T,
}

fn optional<E, T, F>(
    env: &E,
    mode: BuildMode,
    var: OptionalVar<T>,
    parse: F,
) -> Result<T, ConfigError>
where
    E: Env,
    T: std::fmt::Display,
    F: FnOnce(&str) -> Option<T>,
{
    let Some(raw) = env.string(var.name) else {
        return Ok(var.default);
    };
    if let Some(value) = parse(raw.trim()) {
        return Ok(value);
    }
    if mode.is_debug() {
        warn!(
            value = %raw,
            default = %var.default,
            "invalid {}; using default",
            var.name
        );
        return Ok(var.default);
    }
    Err(ConfigError::InvalidEnv {
        name: var.name,
        value: raw,
        expected: var.expected,
    })
}

fn jwt_secret_from_env<E: Env>(env: &E) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    let (origin, mut bytes) = if let Some(secret) = env.string(JWT_SECRET_ENV) {
        (JWT_SECRET_ENV, secret.into_bytes())
    } else if let Some(path) = env.string(JWT_SECRET_FILE_ENV) {
        let path = PathBuf::from(path);
        let mut bytes =
            std::fs::read(&path).map_err(|source| ConfigError::SecretRead { path, source })?;
        while bytes.last().is_some_and(|byte| matches!(byte, b'\n' | b'\r')) {
            bytes.pop();
        }
        (JWT_SECRET_FILE_ENV, bytes)
    } else {
        return Err(ConfigError::MissingEnv {
            name: JWT_SECRET_ENV,
        });
    };

    let length = bytes.len();
    if length < JWT_SECRET_MIN_LEN {
        bytes.zeroize();
        return Err(ConfigError::SecretTooShort {
            origin,
            length,
            min_len: JWT_SECRET_MIN_LEN,
        });
    }
    Ok(Zeroizing::new(bytes))
}

#[cfg(test)]
mod tests;
