//! Bearer token extraction.
//!
//! Handlers that need a caller take an [`AuthenticatedUser`] argument. The
//! extractor reads `Authorization: Bearer <token>` and resolves it through the
//! [`SessionVerifier`](crate::domain::ports::SessionVerifier) held in
//! [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use crate::domain::{Error, Principal};
use crate::inbound::http::state::HttpState;

const BEARER: &str = "Bearer";

/// Caller identity resolved from a current, verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Principal);

impl AuthenticatedUser {
    /// Verified caller.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: Option<&str>) -> Result<&str, Error> {
    let header = header.ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(Error::unauthorized("authorization scheme must be Bearer"));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token"));
    }
    Ok(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| Error::unauthorized("invalid token")))
            .transpose()
            .and_then(bearer_token)
            .map(str::to_owned);
        let state = req.app_data::<web::Data<HttpState>>().cloned();

        Box::pin(async move {
            let token = token?;
            let Some(state) = state else {
                error!("HttpState missing from application data");
                return Err(Error::internal("session verifier not configured"));
            };
            let principal = state.sessions.authenticate(&token).await?;
            Ok(Self(principal))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer    "))]
    #[case(Some("tokenwithoutscheme"))]
    fn unusable_headers_are_unauthorized(#[case] header: Option<&str>) {
        let error = bearer_token(header).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[given("an authorization header with a lower-case scheme")]
    fn a_lower_case_header() -> &'static str {
        "bearer abc.def.ghi"
    }

    #[when("the bearer token is extracted")]
    fn the_token_is_extracted(header: &'static str) -> Result<&'static str, Error> {
        bearer_token(Some(header))
    }

    #[then("the raw token is returned")]
    fn the_raw_token_is_returned(result: Result<&'static str, Error>) {
        assert_eq!(result.expect("token"), "abc.def.ghi");
    }

    #[rstest]
    fn scheme_match_ignores_case() {
        let header = a_lower_case_header();
        let result = the_token_is_extracted(header);
        the_raw_token_is_returned(result);
    }
}
