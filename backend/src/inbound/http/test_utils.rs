//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockAccountCommand, MockAdminCommand, MockLedgerCommand, MockProfileQuery,
    MockSessionVerifier,
};
use crate::domain::{Claims, Email, Error, Principal, Role, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::json_config;

/// Token every [`MockPorts::with_session`] verifier accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// Build a principal for `id` holding `role`.
pub fn principal(id: i64, role: Role) -> Principal {
    let user_id = UserId::new(id).expect("valid id");
    Principal::from(Claims {
        sub: user_id,
        email: Email::new(format!("user{id}@example.com")).expect("valid email"),
        role,
        ver: 0,
        iat: 1_717_243_200,
        exp: 1_717_329_600,
    })
}

/// Mock driving ports, configured per test before being frozen into state.
#[derive(Default)]
pub struct MockPorts {
    /// Account command mock.
    pub accounts: MockAccountCommand,
    /// Profile query mock.
    pub profiles: MockProfileQuery,
    /// Session verifier mock.
    pub sessions: MockSessionVerifier,
    /// Ledger command mock.
    pub ledger: MockLedgerCommand,
    /// Admin command mock.
    pub admin: MockAdminCommand,
}

impl MockPorts {
    /// Accept [`VALID_TOKEN`] as `principal` and reject anything else.
    pub fn with_session(mut self, principal: Principal) -> Self {
        self.sessions.expect_authenticate().returning(move |token| {
            if token == VALID_TOKEN {
                Ok(principal.clone())
            } else {
                Err(Error::unauthorized("invalid token"))
            }
        });
        self
    }

    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.accounts),
            Arc::new(self.profiles),
            Arc::new(self.sessions),
            Arc::new(self.ledger),
            Arc::new(self.admin),
        )
    }
}

/// Application with the state and extractor configuration handlers expect.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .app_data(json_config())
}

/// `Authorization` header carrying [`VALID_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {VALID_TOKEN}"))
}
