//! Shared wiring for integration tests: real domain services over the
//! in-memory store, a fast Argon2 hasher and HS256 tokens on a pinned clock.

use std::sync::Arc;

use actix_web::web;
use chrono::TimeDelta;
use storefront::domain::ports::{AccountCommand, UserRepository};
use storefront::domain::{LoginCredentials, Money, Registration, Role, User, UserId};
use storefront::inbound::http::health::HealthState;
use storefront::inbound::http::state::HttpState;
use storefront::middleware::Deadline;
use storefront::outbound::memory::InMemoryStore;
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use storefront::server::{Adapters, AppDependencies, build_http_state};
use storefront::test_support::{MutableClock, fixed_instant};

pub const SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "secret1";

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(fixed_instant()));
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let tokens = JwtTokenService::new(SECRET, TimeDelta::hours(24), clock.clone());
        let hasher = Argon2PasswordHasher::fast_for_tests().expect("test hasher");
        let state = build_http_state(Adapters {
            users: Arc::clone(&store),
            ledger: Arc::clone(&store),
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            clock: clock.clone(),
        });
        Self {
            store,
            clock,
            state,
        }
    }

    /// Dependencies for [`storefront::server::build_app`] over this harness.
    pub fn deps(&self) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(self.state.clone()),
            deadline: Deadline::default(),
        }
    }

    /// Register `name` with [`PASSWORD`] and return the user and token.
    pub async fn register(&self, name: &str) -> (User, String) {
        let registration =
            Registration::try_from_parts(&format!("{name}@example.com"), PASSWORD, name)
                .expect("valid registration");
        let session = self
            .state
            .accounts
            .register(registration)
            .await
            .expect("registration succeeds");
        (session.user, session.token.token)
    }

    /// Register `name`, grant `role` directly in storage and log in again so
    /// the returned token carries the new role.
    pub async fn register_with_role(&self, name: &str, role: Role) -> (User, String) {
        let (user, _) = self.register(name).await;
        self.store
            .set_role(user.id, role)
            .await
            .expect("role update")
            .expect("user exists");
        let credentials = LoginCredentials::try_from_parts(
            &format!("{name}@example.com"),
            PASSWORD,
        )
        .expect("valid credentials");
        let session = self
            .state
            .accounts
            .login(credentials)
            .await
            .expect("login succeeds");
        (session.user, session.token.token)
    }

    pub async fn balance_of(&self, id: UserId) -> Money {
        self.store
            .find_by_id(id)
            .await
            .expect("lookup")
            .expect("user exists")
            .balance
    }
}
