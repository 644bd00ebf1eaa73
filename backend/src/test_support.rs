//! Test utilities for the storefront crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Email, Money, Role, User, UserId, UserProfile, Username};

/// Clock whose current instant only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// 2024-06-01T12:00:00Z, the instant most tests pin their clocks to.
pub fn fixed_instant() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0) {
        chrono::LocalResult::Single(instant) => instant,
        _ => panic!("fixed instant is unambiguous"),
    }
}

/// A stored user with predictable fields derived from `id`.
///
/// The email is `user{id}@example.com`, the username `user_{id}` and the
/// balance the default starting credit.
pub fn sample_user(id: i64, role: Role) -> User {
    let user_id = UserId::new(id).unwrap_or_else(|err| panic!("sample id {id}: {err}"));
    let email = Email::new(format!("user{id}@example.com"))
        .unwrap_or_else(|err| panic!("sample email: {err}"));
    let username =
        Username::new(format!("user_{id}")).unwrap_or_else(|err| panic!("sample username: {err}"));
    User {
        id: user_id,
        email,
        username,
        role,
        balance: Money::from_minor(100_000),
        profile: UserProfile::default(),
        token_version: 0,
        created_at: fixed_instant(),
        updated_at: fixed_instant(),
    }
}
