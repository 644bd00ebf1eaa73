//! Session verification: token checks plus revocation by token version.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::port_error_mapping::map_user_persistence_error;
use crate::domain::ports::{SessionVerifier, TokenService, UserRepository};
use crate::domain::{Error, Principal, TokenError};

fn map_token_error(error: TokenError) -> Error {
    let message = match error {
        TokenError::Expired => "token has expired",
        TokenError::Malformed
        | TokenError::InvalidSignature
        | TokenError::MissingRequiredClaim => "invalid token",
    };
    Error::unauthorized(message)
}

/// Session service implementing [`SessionVerifier`].
#[derive(Clone)]
pub struct SessionService<R, T> {
    users: Arc<R>,
    tokens: Arc<T>,
}

impl<R, T> SessionService<R, T> {
    /// Build the verifier from account storage and the token codec.
    pub fn new(users: Arc<R>, tokens: Arc<T>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl<R, T> SessionVerifier for SessionService<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    async fn authenticate(&self, token: &str) -> Result<Principal, Error> {
        let claims = self.tokens.verify(token).map_err(|error| {
            debug!(%error, "token rejected");
            map_token_error(error)
        })?;

        let current = self
            .users
            .token_version(claims.sub)
            .await
            .map_err(map_user_persistence_error)?;
        match current {
            Some(version) if version == claims.ver => Ok(Principal::from(claims)),
            Some(_) => {
                debug!(user_id = %claims.sub, "token revoked");
                Err(Error::unauthorized("token has been revoked"))
            }
            None => {
                debug!(user_id = %claims.sub, "token subject no longer exists");
                Err(Error::unauthorized("invalid token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockTokenService, MockUserRepository};
    use crate::domain::{Claims, Email, ErrorCode, Role, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn claims() -> Claims {
        Claims {
            sub: UserId::new(8).expect("valid id"),
            email: Email::new("eight@example.com").expect("valid email"),
            role: Role::Editor,
            ver: 2,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    fn service_with(
        verify: Result<Claims, TokenError>,
        stored_version: Option<i32>,
    ) -> SessionService<MockUserRepository, MockTokenService> {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().return_once(move |_| verify);
        let mut users = MockUserRepository::new();
        users
            .expect_token_version()
            .returning(move |_| Ok(stored_version));
        SessionService::new(Arc::new(users), Arc::new(tokens))
    }

    #[rstest]
    #[tokio::test]
    async fn current_token_yields_principal(claims: Claims) {
        let service = service_with(Ok(claims.clone()), Some(2));
        let principal = service.authenticate("t").await.expect("authenticated");
        assert_eq!(principal.user_id, claims.sub);
        assert_eq!(principal.role, Role::Editor);
    }

    #[rstest]
    #[case(Some(3))]
    #[case(None)]
    #[tokio::test]
    async fn stale_or_orphaned_tokens_are_unauthorized(
        claims: Claims,
        #[case] stored_version: Option<i32>,
    ) {
        let service = service_with(Ok(claims), stored_version);
        let err = service.authenticate("t").await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case(TokenError::Malformed)]
    #[case(TokenError::InvalidSignature)]
    #[case(TokenError::Expired)]
    #[case(TokenError::MissingRequiredClaim)]
    #[tokio::test]
    async fn token_failures_are_unauthorized(#[case] failure: TokenError) {
        let service = service_with(Err(failure), Some(0));
        let err = service.authenticate("t").await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
