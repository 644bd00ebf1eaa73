//! Unit tests for settings parsing.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug)]
struct TempSecretFile {
    path: PathBuf,
}

impl TempSecretFile {
    fn new(contents: &[u8]) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("jwt-secret-{}", Uuid::new_v4()));
        std::fs::write(&path, contents)?;
        Ok(Self { path })
    }

    fn path_str(&self) -> String {
        self.path
            .to_str()
            .expect("temporary path should be valid UTF-8")
            .to_owned()
    }
}

impl Drop for TempSecretFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn minimal() -> HashMap<&'static str, String> {
    HashMap::from([
        (DATABASE_URL_ENV, "postgres://localhost/storefront".to_owned()),
        (PORT_ENV, "8080".to_owned()),
        (JWT_SECRET_ENV, "s".repeat(JWT_SECRET_MIN_LEN)),
    ])
}

fn expect_error(result: Result<AppSettings, ConfigError>) -> ConfigError {
    match result {
        Ok(settings) => panic!("expected a configuration error, got {settings:?}"),
        Err(error) => error,
    }
}

#[rstest]
fn defaults_apply_when_optional_values_are_absent(minimal: HashMap<&'static str, String>) {
    let settings =
        settings_from_env(&mock_env(minimal), BuildMode::Release).expect("valid settings");
    assert_eq!(settings.bind_host, "0.0.0.0");
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.token_ttl, TimeDelta::hours(24));
    assert_eq!(settings.request_timeout, Duration::from_secs(10));
    assert_eq!(settings.db_max_connections, 10);
}

#[rstest]
#[case(DATABASE_URL_ENV)]
#[case(PORT_ENV)]
#[case(JWT_SECRET_ENV)]
fn required_values_are_required_in_every_mode(
    mut minimal: HashMap<&'static str, String>,
    #[case] missing: &'static str,
    #[values(BuildMode::Debug, BuildMode::Release)] mode: BuildMode,
) {
    minimal.remove(missing);
    let error = expect_error(settings_from_env(&mock_env(minimal), mode));
    assert!(matches!(error, ConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
fn short_secret_is_rejected(mut minimal: HashMap<&'static str, String>) {
    minimal.insert(JWT_SECRET_ENV, "short".to_owned());
    let error = expect_error(settings_from_env(&mock_env(minimal), BuildMode::Debug));
    assert!(matches!(error, ConfigError::SecretTooShort { length: 5, .. }));
}

#[rstest]
fn secret_file_is_read_without_trailing_newline(mut minimal: HashMap<&'static str, String>) {
    let file = TempSecretFile::new(format!("{}\n", "k".repeat(40)).as_bytes())
        .expect("temp secret file");
    minimal.remove(JWT_SECRET_ENV);
    minimal.insert(JWT_SECRET_FILE_ENV, file.path_str());

    let settings =
        settings_from_env(&mock_env(minimal), BuildMode::Release).expect("valid settings");
    assert_eq!(settings.jwt_secret.len(), 40);
}

#[rstest]
fn unreadable_secret_file_is_an_error(mut minimal: HashMap<&'static str, String>) {
    minimal.remove(JWT_SECRET_ENV);
    minimal.insert(
        JWT_SECRET_FILE_ENV,
        format!("/nonexistent/{}", Uuid::new_v4()),
    );
    let error = expect_error(settings_from_env(&mock_env(minimal), BuildMode::Debug));
    assert!(matches!(error, ConfigError::SecretRead { .. }));
}

#[rstest]
#[case(TOKEN_TTL_HOURS_ENV, "0")]
#[case(TOKEN_TTL_HOURS_ENV, "721")]
#[case(REQUEST_TIMEOUT_SECS_ENV, "soon")]
#[case(DB_MAX_CONNECTIONS_ENV, "-1")]
fn release_rejects_invalid_optional_values(
    mut minimal: HashMap<&'static str, String>,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    minimal.insert(name, value.to_owned());
    let error = expect_error(settings_from_env(&mock_env(minimal), BuildMode::Release));
    assert!(matches!(error, ConfigError::InvalidEnv { name: n, .. } if n == name));
}

#[rstest]
fn debug_falls_back_to_defaults(mut minimal: HashMap<&'static str, String>) {
    minimal.insert(TOKEN_TTL_HOURS_ENV, "forever".to_owned());
    let settings =
        settings_from_env(&mock_env(minimal), BuildMode::Debug).expect("valid settings");
    assert_eq!(settings.token_ttl, TimeDelta::hours(24));
}

#[rstest]
fn explicit_values_override_defaults(mut minimal: HashMap<&'static str, String>) {
    minimal.insert(BIND_HOST_ENV, "127.0.0.1".to_owned());
    minimal.insert(TOKEN_TTL_HOURS_ENV, "720".to_owned());
    minimal.insert(REQUEST_TIMEOUT_SECS_ENV, "3".to_owned());
    minimal.insert(DB_MAX_CONNECTIONS_ENV, "25".to_owned());

    let settings =
        settings_from_env(&mock_env(minimal), BuildMode::Release).expect("valid settings");
    assert_eq!(settings.bind_addr(), ("127.0.0.1".to_owned(), 8080));
    assert_eq!(settings.token_ttl.num_hours(), 720);
    assert_eq!(settings.request_timeout, Duration::from_secs(3));
    assert_eq!(settings.db_max_connections, 25);
}

#[rstest]
fn debug_output_hides_secrets(minimal: HashMap<&'static str, String>) {
    let settings =
        settings_from_env(&mock_env(minimal), BuildMode::Release).expect("valid settings");
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("sss"));
    assert!(!rendered.contains("postgres://"));
}
