//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AdminCommand, LedgerCommand, ProfileQuery, SessionVerifier,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and profile writes.
    pub accounts: Arc<dyn AccountCommand>,
    /// Profile reads.
    pub profiles: Arc<dyn ProfileQuery>,
    /// Bearer token verification.
    pub sessions: Arc<dyn SessionVerifier>,
    /// Balance adjustments and checkout.
    pub ledger: Arc<dyn LedgerCommand>,
    /// Administration commands.
    pub admin: Arc<dyn AdminCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        profiles: Arc<dyn ProfileQuery>,
        sessions: Arc<dyn SessionVerifier>,
        ledger: Arc<dyn LedgerCommand>,
        admin: Arc<dyn AdminCommand>,
    ) -> Self {
        Self {
            accounts,
            profiles,
            sessions,
            ledger,
            admin,
        }
    }
}
