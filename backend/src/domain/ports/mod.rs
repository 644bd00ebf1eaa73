//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `BalanceLedger`, `PasswordHasher`,
//! `TokenService`) are implemented by outbound adapters. Driving ports
//! (`AccountCommand`, `ProfileQuery`, `SessionVerifier`, `LedgerCommand`,
//! `AdminCommand`) are implemented by domain services and called by the HTTP
//! adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod admin_command;
mod balance_ledger;
mod ledger_command;
mod password_hasher;
mod profile_query;
mod session_verifier;
mod token_service;
mod user_repository;

pub use account_command::{AccountCommand, AuthSession};
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use admin_command::AdminCommand;
#[cfg(test)]
pub use admin_command::MockAdminCommand;
pub use balance_ledger::{BalanceLedger, LedgerError};
#[cfg(test)]
pub use balance_ledger::MockBalanceLedger;
pub use ledger_command::LedgerCommand;
#[cfg(test)]
pub use ledger_command::MockLedgerCommand;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use session_verifier::SessionVerifier;
#[cfg(test)]
pub use session_verifier::MockSessionVerifier;
pub use token_service::{TokenIssueError, TokenService};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use user_repository::{NewUser, StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
