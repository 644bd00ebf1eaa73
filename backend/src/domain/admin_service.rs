//! Account administration over the user repository and balance ledger.
//!
//! Each call checks the caller's role first, then the superadmin guard, and
//! only then touches storage.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::port_error_mapping::{map_ledger_error, map_user_persistence_error};
use crate::domain::ports::{AdminCommand, BalanceLedger, UserRepository};
use crate::domain::{
    AccountMutation, AdminStats, Error, Money, Principal, Role, StatsWindow, User, UserId,
    authorize, ensure_superadmin_mutation_allowed,
};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

fn user_not_found() -> Error {
    Error::not_found("user not found")
}

/// Admin service implementing [`AdminCommand`].
#[derive(Clone)]
pub struct AdminService<R, L> {
    users: Arc<R>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<R, L> AdminService<R, L> {
    /// Build the service; `clock` anchors the statistics window.
    pub fn new(users: Arc<R>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            ledger,
            clock,
        }
    }
}

#[async_trait]
impl<R, L> AdminCommand for AdminService<R, L>
where
    R: UserRepository,
    L: BalanceLedger,
{
    async fn list_users(&self, actor: &Principal) -> Result<Vec<User>, Error> {
        authorize(actor.role, ADMIN_ONLY)?;
        self.users
            .list_all()
            .await
            .map_err(map_user_persistence_error)
    }

    async fn set_role(&self, actor: &Principal, target: UserId, role: Role) -> Result<User, Error> {
        authorize(actor.role, ADMIN_ONLY)?;
        ensure_superadmin_mutation_allowed(target, AccountMutation::ChangeRole(role))?;
        let user = self
            .users
            .set_role(target, role)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(user_not_found)?;
        info!(actor = %actor.user_id, %target, role = role.as_str(), "role changed");
        Ok(user)
    }

    async fn set_balance(
        &self,
        actor: &Principal,
        target: UserId,
        value: Money,
    ) -> Result<Money, Error> {
        authorize(actor.role, ADMIN_ONLY)?;
        if value.is_negative() {
            return Err(Error::invalid_request("balance must not be negative")
                .with_details(json!({ "field": "balance", "code": "negative_balance" })));
        }
        let balance = self
            .ledger
            .set_absolute(target, value)
            .await
            .map_err(map_ledger_error)?;
        info!(actor = %actor.user_id, %target, %balance, "balance overwritten");
        Ok(balance)
    }

    async fn delete_user(&self, actor: &Principal, target: UserId) -> Result<(), Error> {
        authorize(actor.role, ADMIN_ONLY)?;
        ensure_superadmin_mutation_allowed(target, AccountMutation::Delete)?;
        let deleted = self
            .users
            .delete(target)
            .await
            .map_err(map_user_persistence_error)?;
        if !deleted {
            return Err(user_not_found());
        }
        info!(actor = %actor.user_id, %target, "account deleted");
        Ok(())
    }

    async fn stats(&self, actor: &Principal) -> Result<AdminStats, Error> {
        authorize(actor.role, ADMIN_ONLY)?;
        let window = StatsWindow::ending_at(self.clock.utc());
        let signups = self
            .users
            .signup_counts(window)
            .await
            .map_err(map_user_persistence_error)?;
        let sales = self
            .ledger
            .sales_summary()
            .await
            .map_err(map_ledger_error)?;
        Ok(AdminStats::from_parts(signups, sales))
    }
}

#[cfg(test)]
#[path = "admin_service_tests.rs"]
mod tests;
