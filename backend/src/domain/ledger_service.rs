//! Self-service balance operations over the [`BalanceLedger`] port.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::port_error_mapping::map_ledger_error;
use crate::domain::ports::{BalanceLedger, LedgerCommand};
use crate::domain::{Cart, Error, Money, Receipt, UserId};

/// Ledger service implementing [`LedgerCommand`].
#[derive(Clone)]
pub struct LedgerService<L> {
    ledger: Arc<L>,
}

impl<L> LedgerService<L> {
    /// Wrap the balance ledger.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L> LedgerCommand for LedgerService<L>
where
    L: BalanceLedger,
{
    async fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, Error> {
        if delta.is_zero() {
            return Err(Error::invalid_request("amount must not be zero")
                .with_details(json!({ "field": "amount", "code": "zero_amount" })));
        }
        let balance = self
            .ledger
            .adjust(user_id, delta)
            .await
            .map_err(map_ledger_error)?;
        info!(%user_id, %delta, %balance, "balance adjusted");
        Ok(balance)
    }

    async fn checkout(&self, user_id: UserId, cart: Cart) -> Result<Receipt, Error> {
        let receipt = self
            .ledger
            .checkout(user_id, &cart)
            .await
            .map_err(map_ledger_error)?;
        info!(
            %user_id,
            order_id = receipt.order_id.get(),
            total = %receipt.total,
            "checkout completed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{LedgerError, MockBalanceLedger};
    use crate::domain::{ErrorCode, OrderId};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn uid(id: i64) -> UserId {
        UserId::new(id).expect("valid id")
    }

    #[rstest]
    #[tokio::test]
    async fn zero_delta_never_reaches_the_ledger() {
        let mut ledger = MockBalanceLedger::new();
        ledger.expect_adjust().times(0);
        let service = LedgerService::new(Arc::new(ledger));

        let err = service
            .adjust(uid(1), Money::zero())
            .await
            .expect_err("zero delta");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn adjust_returns_new_balance() {
        let mut ledger = MockBalanceLedger::new();
        ledger
            .expect_adjust()
            .with(eq(uid(1)), eq(Money::from_minor(-2_500)))
            .times(1)
            .returning(|_, _| Ok(Money::from_minor(97_500)));
        let service = LedgerService::new(Arc::new(ledger));

        let balance = service
            .adjust(uid(1), Money::from_minor(-2_500))
            .await
            .expect("adjusted");
        assert_eq!(balance, Money::from_minor(97_500));
    }

    #[rstest]
    #[tokio::test]
    async fn overdraft_is_an_invalid_request() {
        let mut ledger = MockBalanceLedger::new();
        ledger
            .expect_adjust()
            .returning(|_, _| Err(LedgerError::insufficient_funds()));
        let service = LedgerService::new(Arc::new(ledger));

        let err = service
            .adjust(uid(1), Money::from_minor(-1))
            .await
            .expect_err("overdraft");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn checkout_passes_cart_through() {
        let cart = Cart::try_from_pairs([(3, 2), (3, 1), (1, 1)]).expect("valid cart");
        let mut ledger = MockBalanceLedger::new();
        ledger
            .expect_checkout()
            .withf(|_, cart| {
                cart.product_ids().map(|id| id.get()).collect::<Vec<_>>() == vec![1, 3]
            })
            .returning(|_, _| {
                Ok(Receipt {
                    order_id: OrderId::new(42),
                    total: Money::from_minor(3_000),
                    new_balance: Money::from_minor(97_000),
                })
            });
        let service = LedgerService::new(Arc::new(ledger));

        let receipt = service.checkout(uid(1), cart).await.expect("checkout");
        assert_eq!(receipt.order_id.get(), 42);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let cart = Cart::try_from_pairs([(99, 1)]).expect("valid cart");
        let mut ledger = MockBalanceLedger::new();
        ledger
            .expect_checkout()
            .returning(|_, _| Err(LedgerError::product_not_found(99_i64)));
        let service = LedgerService::new(Arc::new(ledger));

        let err = service.checkout(uid(1), cart).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
