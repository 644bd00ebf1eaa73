//! Port for balance mutations.
//!
//! Every operation must be atomic at the storage layer: the sufficiency check
//! and the write happen in the same statement (or the same transaction for
//! checkout), so concurrent callers can never drive a balance below zero.

use async_trait::async_trait;

use crate::domain::{Cart, Money, Receipt, SalesSummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by balance ledger adapters.
    pub enum LedgerError {
        /// Ledger storage could not be reached.
        Connection { message: String } => "ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ledger query failed: {message}",
        /// The account does not exist.
        UserNotFound => "user not found",
        /// The debit would take the balance below zero.
        InsufficientFunds => "insufficient funds",
        /// A cart line references a product that does not exist.
        ProductNotFound { product_id: i64 } => "product {product_id} not found",
        /// The resulting amount does not fit the balance column.
        OutOfRange => "amount out of range",
    }
}

/// Driven port for balances, orders and catalogue totals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Add `delta` (which may be negative) and return the new balance.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] when the result would be
    /// negative and with [`LedgerError::UserNotFound`] when no such user
    /// exists; the balance is untouched in both cases.
    async fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, LedgerError>;

    /// Overwrite the balance with a non-negative value.
    async fn set_absolute(&self, user_id: UserId, value: Money) -> Result<Money, LedgerError>;

    /// Price the cart, debit the total and record the order in one unit.
    async fn checkout(&self, user_id: UserId, cart: &Cart) -> Result<Receipt, LedgerError>;

    /// Catalogue size, order count and completed-order revenue.
    async fn sales_summary(&self) -> Result<SalesSummary, LedgerError>;
}
