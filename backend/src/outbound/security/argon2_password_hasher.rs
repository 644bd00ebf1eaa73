//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool. A
//! dummy digest produced at construction backs `verify(.., None)`, so an
//! unknown email costs the same as a wrong password.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

const DUMMY_PASSWORD: &[u8] = b"storefront-timing-equaliser";

/// Argon2id hasher with fixed cost parameters.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
    dummy_digest: String,
}

impl Argon2PasswordHasher {
    /// Hasher with the `argon2` crate's default Argon2id parameters.
    ///
    /// # Errors
    ///
    /// Fails when the dummy digest cannot be produced.
    pub fn new() -> Result<Self, PasswordHashError> {
        Self::with_params(Params::default())
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Fails when the dummy digest cannot be produced.
    pub fn with_params(params: Params) -> Result<Self, PasswordHashError> {
        let dummy_digest = hash_blocking(&argon2_for(&params), DUMMY_PASSWORD)?;
        Ok(Self {
            params,
            dummy_digest,
        })
    }

    /// Hasher with memory (KiB), iteration and lane costs.
    ///
    /// # Errors
    ///
    /// Fails when Argon2 rejects the costs or the dummy digest cannot be
    /// produced.
    pub fn with_cost(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, lanes, None).map_err(map_params_error)?;
        Self::with_params(params)
    }

    /// Cheap parameters for tests; never use in production.
    ///
    /// # Errors
    ///
    /// Fails when the dummy digest cannot be produced.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fast_for_tests() -> Result<Self, PasswordHashError> {
        Self::with_cost(8, 1, 1)
    }
}

fn argon2_for(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn map_hash_error(error: password_hash::Error) -> PasswordHashError {
    PasswordHashError::hashing(error.to_string())
}

fn map_params_error(error: argon2::Error) -> PasswordHashError {
    PasswordHashError::hashing(format!("invalid argon2 parameters: {error}"))
}

fn hash_blocking(argon2: &Argon2<'_>, plaintext: &[u8]) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(plaintext, &salt)
        .map(|digest| digest.to_string())
        .map_err(map_hash_error)
}

fn verify_blocking(argon2: &Argon2<'_>, plaintext: &[u8], encoded: &str) -> bool {
    match PhcString::new(encoded) {
        Ok(parsed) => argon2.verify_password(plaintext, &parsed).is_ok(),
        Err(error) => {
            warn!(%error, "stored password digest is unparseable");
            false
        }
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: Zeroizing<String>) -> Result<PasswordHash, PasswordHashError> {
        let argon2 = argon2_for(&self.params);
        let encoded = tokio::task::spawn_blocking(move || hash_blocking(&argon2, plaintext.as_bytes()))
            .await
            .map_err(|error| PasswordHashError::hashing(error.to_string()))??;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(&self, plaintext: Zeroizing<String>, digest: Option<PasswordHash>) -> bool {
        let argon2 = argon2_for(&self.params);
        let known_account = digest.is_some();
        let encoded = digest.map_or_else(
            || self.dummy_digest.clone(),
            |digest| digest.as_str().to_owned(),
        );

        let outcome = tokio::task::spawn_blocking(move || {
            verify_blocking(&argon2, plaintext.as_bytes(), &encoded)
        })
        .await;
        match outcome {
            Ok(matched) => matched && known_account,
            Err(error) => {
                warn!(%error, "password verification task failed");
                false
            }
        }
    }
}
