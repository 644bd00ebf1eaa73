//! Driving port for self-service balance operations.

use async_trait::async_trait;

use crate::domain::{Cart, Error, Money, Receipt, UserId};

/// Driving port for balance adjustments and checkout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerCommand: Send + Sync {
    /// Apply a signed, non-zero delta and return the new balance.
    async fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, Error>;

    /// Buy the cart at server-side prices.
    async fn checkout(&self, user_id: UserId, cart: Cart) -> Result<Receipt, Error>;
}
