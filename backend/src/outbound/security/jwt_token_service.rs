//! HS256 JWT implementation of the `TokenService` port.
//!
//! Expiry is checked against the injected [`Clock`] instead of the system
//! time that `jsonwebtoken` would use, so tests can move time explicitly.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::{TokenIssueError, TokenService};
use crate::domain::{Claims, Email, IssuedToken, Role, TokenError, TokenSubject, UserId};

/// Claims as they appear on the wire, before required-claim checks.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<Value>,
    email: Option<String>,
    role: Option<String>,
    ver: Option<i32>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Signs and verifies session tokens with a shared secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service signing with `secret`; tokens live for `ttl`.
    pub fn new(secret: &[u8], ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }
}

/// A subject must be a positive integer, either as a number or a string.
fn parse_subject(raw: &Value) -> Option<UserId> {
    let id = match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse::<i64>().ok(),
        _ => None,
    }?;
    UserId::new(id).ok()
}

fn into_claims(raw: RawClaims) -> Result<Claims, TokenError> {
    let sub = raw
        .sub
        .as_ref()
        .and_then(parse_subject)
        .ok_or(TokenError::MissingRequiredClaim)?;
    let exp = raw.exp.ok_or(TokenError::MissingRequiredClaim)?;
    let email = raw.email.ok_or(TokenError::MissingRequiredClaim)?;
    let role = raw.role.ok_or(TokenError::MissingRequiredClaim)?;
    let ver = raw.ver.ok_or(TokenError::MissingRequiredClaim)?;
    let iat = raw.iat.ok_or(TokenError::MissingRequiredClaim)?;

    Ok(Claims {
        sub,
        email: Email::new(email).map_err(|_| TokenError::Malformed)?,
        role: role.parse::<Role>().map_err(|_| TokenError::Malformed)?,
        ver,
        iat,
        exp,
    })
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &TokenSubject) -> Result<IssuedToken, TokenIssueError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: subject.user_id,
            email: subject.email.clone(),
            role: subject.role,
            ver: subject.token_version,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| TokenIssueError::signing(error.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation).map_err(
            |error| match error.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            },
        )?;
        let claims = into_claims(data.claims)?;
        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::test_support::{MutableClock, fixed_instant};
    use rstest::{fixture, rstest};
    use serde_json::json;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    struct Harness {
        clock: Arc<MutableClock>,
        service: JwtTokenService,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(MutableClock::new(fixed_instant()));
        let service = JwtTokenService::new(SECRET, TimeDelta::hours(24), clock.clone());
        Harness { clock, service }
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: UserId::new(12).expect("id"),
            email: Email::new("twelve@example.com").expect("email"),
            role: Role::Editor,
            token_version: 4,
        }
    }

    fn sign_raw(payload: &Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            payload,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("sign payload")
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_claims(harness: Harness) {
        let issued = harness.service.issue(&subject()).expect("issue");
        let claims = harness.service.verify(&issued.token).expect("verify");

        assert_eq!(claims.sub, subject().user_id);
        assert_eq!(claims.role, Role::Editor);
        assert_eq!(claims.ver, 4);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(harness.service.verify(&issued.token), Ok(claims));
    }

    #[rstest]
    fn tokens_expire_once_the_clock_reaches_exp(harness: Harness) {
        let issued = harness.service.issue(&subject()).expect("issue");
        harness.clock.advance_seconds(24 * 3600 - 1);
        assert!(harness.service.verify(&issued.token).is_ok());
        harness.clock.advance_seconds(1);
        assert_eq!(
            harness.service.verify(&issued.token),
            Err(TokenError::Expired)
        );
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("a.b")]
    #[case("a.b.c.d")]
    #[case("!!.??.**")]
    fn structural_garbage_is_malformed(harness: Harness, #[case] token: &str) {
        assert_eq!(harness.service.verify(token), Err(TokenError::Malformed));
    }

    #[rstest]
    fn foreign_signatures_are_rejected(harness: Harness) {
        let issued = harness.service.issue(&subject()).expect("issue");
        let other = JwtTokenService::new(
            b"ffffffffffffffffffffffffffffffff",
            TimeDelta::hours(24),
            harness.clock.clone(),
        );
        assert_eq!(
            other.verify(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[rstest]
    #[case(json!({ "email": "a@b.co", "role": "user", "ver": 0, "iat": 0, "exp": 4_000_000_000_i64 }))]
    #[case(json!({ "sub": "abc", "email": "a@b.co", "role": "user", "ver": 0, "iat": 0, "exp": 4_000_000_000_i64 }))]
    #[case(json!({ "sub": -3, "email": "a@b.co", "role": "user", "ver": 0, "iat": 0, "exp": 4_000_000_000_i64 }))]
    #[case(json!({ "sub": 1, "email": "a@b.co", "role": "user", "ver": 0, "iat": 0 }))]
    fn missing_or_invalid_subject_and_expiry_are_reported(
        harness: Harness,
        #[case] payload: Value,
    ) {
        assert_eq!(
            harness.service.verify(&sign_raw(&payload)),
            Err(TokenError::MissingRequiredClaim)
        );
    }

    #[rstest]
    fn numeric_string_subjects_are_accepted(harness: Harness) {
        let token = sign_raw(&json!({
            "sub": "9",
            "email": "nine@example.com",
            "role": "admin",
            "ver": 1,
            "iat": 0,
            "exp": 4_000_000_000_i64,
        }));
        let claims = harness.service.verify(&token).expect("valid");
        assert_eq!(claims.sub.get(), 9);
    }
}
