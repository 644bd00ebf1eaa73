//! Driving port for account administration.
//!
//! Every operation takes the calling [`Principal`] and enforces the admin
//! role itself, so adapters cannot forget the gate.

use async_trait::async_trait;

use crate::domain::{AdminStats, Error, Money, Principal, Role, User, UserId};

/// Administrative operations, each gated on the admin role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminCommand: Send + Sync {
    /// All accounts, newest first.
    async fn list_users(&self, actor: &Principal) -> Result<Vec<User>, Error>;

    /// Change a role; the target's outstanding tokens are revoked.
    async fn set_role(&self, actor: &Principal, target: UserId, role: Role)
    -> Result<User, Error>;

    /// Overwrite a balance with a non-negative value.
    async fn set_balance(
        &self,
        actor: &Principal,
        target: UserId,
        value: Money,
    ) -> Result<Money, Error>;

    /// Delete an account.
    async fn delete_user(&self, actor: &Principal, target: UserId) -> Result<(), Error>;

    /// Dashboard counters over users, products and orders.
    async fn stats(&self, actor: &Principal) -> Result<AdminStats, Error>;
}
