//! Tests for the account service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockTokenService, MockUserRepository, UserPersistenceError,
};
use crate::domain::{ErrorCode, IssuedToken, PasswordHash};
use crate::test_support::{MutableClock, fixed_instant, sample_user};

type Service = AccountService<MockUserRepository, MockPasswordHasher, MockTokenService>;

struct Mocks {
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenService,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        users: MockUserRepository::new(),
        hasher: MockPasswordHasher::new(),
        tokens: MockTokenService::new(),
    }
}

fn make_service(mocks: Mocks) -> Service {
    AccountService::new(
        Arc::new(mocks.users),
        Arc::new(mocks.hasher),
        Arc::new(mocks.tokens),
        Arc::new(MutableClock::new(fixed_instant())),
    )
}

fn expect_token(tokens: &mut MockTokenService) {
    tokens.expect_issue().times(1).returning(|subject| {
        Ok(IssuedToken {
            token: format!("token-for-{}", subject.user_id),
            expires_at: fixed_instant(),
        })
    });
}

fn uid(id: i64) -> UserId {
    UserId::new(id).expect("valid id")
}

#[rstest]
#[tokio::test]
async fn register_creates_user_with_starting_credit(mut mocks: Mocks) {
    mocks
        .hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordHash::new("$argon2id$digest")));
    mocks.users.expect_create().times(1).returning(|new_user| {
        assert_eq!(new_user.role, Role::User);
        assert_eq!(new_user.balance, Money::from_minor(STARTING_BALANCE_MINOR));
        assert_eq!(new_user.password_hash.as_str(), "$argon2id$digest");
        let mut user = sample_user(5, Role::User);
        user.email = new_user.email.clone();
        Ok(user)
    });
    expect_token(&mut mocks.tokens);

    let registration =
        Registration::try_from_parts("New@Example.com", "secret1", "newbie").expect("valid");
    let session = make_service(mocks)
        .register(registration)
        .await
        .expect("registration succeeds");

    assert_eq!(session.user.email.as_ref(), "new@example.com");
    assert_eq!(session.token.token, "token-for-5");
}

#[rstest]
#[tokio::test]
async fn register_reports_taken_email(mut mocks: Mocks) {
    mocks
        .hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("digest")));
    mocks
        .users
        .expect_create()
        .returning(|_| Err(UserPersistenceError::duplicate_email()));

    let registration =
        Registration::try_from_parts("dup@example.com", "secret1", "dupe").expect("valid");
    let err = make_service(mocks)
        .register(registration)
        .await
        .expect_err("duplicate email");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("email_taken")
    );
}

#[rstest]
#[tokio::test]
async fn unknown_email_still_runs_a_verification(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .returning(|_| Ok(None));
    mocks
        .hasher
        .expect_verify()
        .withf(|_, digest| digest.is_none())
        .times(1)
        .returning(|_, _| false);

    let creds = LoginCredentials::try_from_parts("ghost@example.com", "secret1").expect("valid");
    let err = make_service(mocks).login(creds).await.expect_err("unknown");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn wrong_password_matches_unknown_email_message(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .returning(|_| {
            Ok(Some(StoredCredentials {
                user: sample_user(3, Role::User),
                password_hash: PasswordHash::new("digest"),
            }))
        });
    mocks.hasher.expect_verify().returning(|_, _| false);

    let creds = LoginCredentials::try_from_parts("user3@example.com", "wrong-pass").expect("valid");
    let err = make_service(mocks).login(creds).await.expect_err("mismatch");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn login_issues_token_for_stored_user(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .returning(|_| {
            Ok(Some(StoredCredentials {
                user: sample_user(3, Role::Seller),
                password_hash: PasswordHash::new("digest"),
            }))
        });
    mocks
        .hasher
        .expect_verify()
        .withf(|plain, digest| plain.as_str() == "secret1" && digest.is_some())
        .returning(|_, _| true);
    expect_token(&mut mocks.tokens);

    let creds = LoginCredentials::try_from_parts("user3@example.com", "secret1").expect("valid");
    let session = make_service(mocks).login(creds).await.expect("login");
    assert_eq!(session.user.role, Role::Seller);
    assert_eq!(session.token.token, "token-for-3");
}

#[rstest]
#[tokio::test]
async fn profile_of_missing_user_is_not_found(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_by_id()
        .with(eq(uid(9)))
        .returning(|_| Ok(None));

    let err = make_service(mocks).profile(uid(9)).await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn future_birth_date_is_rejected_by_the_clock(mocks: Mocks) {
    let update = ProfileUpdate {
        birth_date: Some("2024-06-02".to_owned()),
        ..ProfileUpdate::default()
    };
    let err = make_service(mocks)
        .update_profile(uid(2), update)
        .await
        .expect_err("future date");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("birth_date")
    );
}

#[rstest]
#[tokio::test]
async fn profile_update_reports_taken_username(mut mocks: Mocks) {
    mocks
        .users
        .expect_update_profile()
        .returning(|_, _| Err(UserPersistenceError::duplicate_username()));

    let update = ProfileUpdate {
        username: Some("taken".to_owned()),
        ..ProfileUpdate::default()
    };
    let err = make_service(mocks)
        .update_profile(uid(2), update)
        .await
        .expect_err("taken");
    assert_eq!(
        err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("username_taken")
    );
}

#[rstest]
#[tokio::test]
async fn avatar_is_trimmed_before_storage(mut mocks: Mocks) {
    mocks
        .users
        .expect_update_avatar()
        .withf(|_, url| url.to_string() == "https://cdn.example.com/a.png")
        .returning(|_, _| Ok(true));

    let stored = make_service(mocks)
        .update_avatar(uid(2), "  https://cdn.example.com/a.png ".to_owned())
        .await
        .expect("avatar");
    assert_eq!(stored, "https://cdn.example.com/a.png");
}

#[rstest]
#[tokio::test]
async fn logout_bumps_token_version(mut mocks: Mocks) {
    mocks
        .users
        .expect_bump_token_version()
        .with(eq(uid(4)))
        .times(1)
        .returning(|_| Ok(true));

    make_service(mocks).logout(uid(4)).await.expect("logout");
}
