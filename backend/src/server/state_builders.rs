//! Wiring from driven adapters to the driving ports held in [`HttpState`].

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{BalanceLedger, PasswordHasher, TokenService, UserRepository};
use crate::domain::{AccountService, AdminService, LedgerService, SessionService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{DbPool, DieselBalanceLedger, DieselUserRepository};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

/// Driven adapters every service is built from.
pub struct Adapters<R, L, H, T> {
    /// Account storage.
    pub users: Arc<R>,
    /// Balance and order storage.
    pub ledger: Arc<L>,
    /// Password digests.
    pub hasher: Arc<H>,
    /// Token signing and verification.
    pub tokens: Arc<T>,
    /// Time source for tokens and stats.
    pub clock: Arc<dyn Clock>,
}

/// Build the domain services over `adapters` and bundle them for handlers.
pub fn build_http_state<R, L, H, T>(adapters: Adapters<R, L, H, T>) -> HttpState
where
    R: UserRepository + 'static,
    L: BalanceLedger + 'static,
    H: PasswordHasher + 'static,
    T: TokenService + 'static,
{
    let Adapters {
        users,
        ledger,
        hasher,
        tokens,
        clock,
    } = adapters;

    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        hasher,
        Arc::clone(&tokens),
        Arc::clone(&clock),
    ));
    let sessions = Arc::new(SessionService::new(Arc::clone(&users), tokens));
    let ledger_service = Arc::new(LedgerService::new(Arc::clone(&ledger)));
    let admin = Arc::new(AdminService::new(users, ledger, clock));

    HttpState::new(accounts.clone(), accounts, sessions, ledger_service, admin)
}

/// PostgreSQL-backed adapters sharing one pool.
pub fn postgres_adapters(
    pool: DbPool,
    hasher: Argon2PasswordHasher,
    tokens: JwtTokenService,
    clock: Arc<dyn Clock>,
) -> Adapters<DieselUserRepository, DieselBalanceLedger, Argon2PasswordHasher, JwtTokenService> {
    Adapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        ledger: Arc::new(DieselBalanceLedger::new(pool)),
        hasher: Arc::new(hasher),
        tokens: Arc::new(tokens),
        clock,
    }
}
