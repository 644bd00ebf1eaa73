//! PostgreSQL-backed `BalanceLedger` implementation using Diesel ORM.
//!
//! Every debit is a conditional `UPDATE ... RETURNING`: the sufficiency check
//! and the write are one statement, so PostgreSQL's row lock serialises
//! concurrent callers and no balance can go negative. When the update matches
//! no row, a read-only lookup decides which error to report.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ports::{BalanceLedger, LedgerError};
use crate::domain::{Cart, Money, OrderId, Receipt, SalesSummary, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewOrderItemRow, NewOrderRow, ProductPriceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{order_items, orders, products, users};

const ORDER_STATUS_COMPLETED: &str = "completed";

/// Diesel-backed implementation of the `BalanceLedger` port.
#[derive(Clone)]
pub struct DieselBalanceLedger {
    pool: DbPool,
}

impl DieselBalanceLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerError {
    LedgerError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerError {
    match classify_diesel_error(error) {
        DieselFailure::Connection => LedgerError::connection("database connection error"),
        DieselFailure::UniqueViolation { .. } => LedgerError::query("unique constraint violated"),
        DieselFailure::Query(message) => LedgerError::query(message),
    }
}

fn stored_money(value: Decimal) -> Result<Money, LedgerError> {
    Money::try_from_decimal(value).map_err(|_| LedgerError::query("stored amount is invalid"))
}

/// Failure inside the checkout transaction; any variant rolls it back.
#[derive(Debug)]
enum CheckoutFailure {
    Diesel(diesel::result::Error),
    Ledger(LedgerError),
}

impl From<diesel::result::Error> for CheckoutFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<LedgerError> for CheckoutFailure {
    fn from(error: LedgerError) -> Self {
        Self::Ledger(error)
    }
}

fn map_checkout_failure(failure: CheckoutFailure) -> LedgerError {
    match failure {
        CheckoutFailure::Diesel(error) => map_diesel_error(error),
        CheckoutFailure::Ledger(error) => error,
    }
}

/// Decide why a conditional debit matched no row.
///
/// Read-only: it never writes, so a concurrent change between the update and
/// the lookup can only affect which error is reported.
async fn explain_rejected_update(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    delta: Decimal,
) -> Result<LedgerError, diesel::result::Error> {
    let balance: Option<Decimal> = users::table
        .find(user_id.get())
        .select(users::balance)
        .first(conn)
        .await
        .optional()?;
    Ok(match balance {
        None => LedgerError::user_not_found(),
        Some(balance) if balance + delta < Decimal::ZERO => LedgerError::insufficient_funds(),
        Some(_) => LedgerError::out_of_range(),
    })
}

/// Apply `delta` only when the result stays within `[0, Money::max()]`.
async fn conditional_adjust(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    delta: Decimal,
) -> Result<Option<Decimal>, diesel::result::Error> {
    let ceiling = Money::max().as_decimal();
    diesel::update(
        users::table
            .find(user_id.get())
            .filter((users::balance + delta).ge(Decimal::ZERO))
            .filter((users::balance + delta).le(ceiling)),
    )
    .set((
        users::balance.eq(users::balance + delta),
        users::updated_at.eq(now),
    ))
    .returning(users::balance)
    .get_result(conn)
    .await
    .optional()
}

/// Sum effective prices for the cart, failing on the first unknown product.
fn price_cart(cart: &Cart, rows: &[ProductPriceRow]) -> Result<Vec<(i64, u32, Money)>, LedgerError> {
    cart.lines()
        .iter()
        .map(|line| {
            let id = line.product_id.get();
            let row = rows
                .iter()
                .find(|row| row.id == id)
                .ok_or_else(|| LedgerError::product_not_found(id))?;
            let unit_price = Money::try_from_decimal(row.effective_price())
                .map_err(|_| LedgerError::query("stored price is invalid"))?;
            Ok((id, line.quantity, unit_price))
        })
        .collect()
}

fn cart_total(priced: &[(i64, u32, Money)]) -> Result<Money, LedgerError> {
    priced
        .iter()
        .try_fold(Money::zero(), |total, (_, quantity, unit_price)| {
            unit_price
                .checked_mul_quantity(*quantity)
                .and_then(|line_total| total.checked_add(line_total))
        })
        .ok_or_else(LedgerError::out_of_range)
}

#[async_trait]
impl BalanceLedger for DieselBalanceLedger {
    async fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, LedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let delta = delta.as_decimal();

        match conditional_adjust(&mut conn, user_id, delta)
            .await
            .map_err(map_diesel_error)?
        {
            Some(balance) => stored_money(balance),
            None => {
                let error = explain_rejected_update(&mut conn, user_id, delta)
                    .await
                    .map_err(map_diesel_error)?;
                debug!(%user_id, %error, "balance adjustment rejected");
                Err(error)
            }
        }
    }

    async fn set_absolute(&self, user_id: UserId, value: Money) -> Result<Money, LedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let balance: Option<Decimal> = diesel::update(users::table.find(user_id.get()))
            .set((
                users::balance.eq(value.as_decimal()),
                users::updated_at.eq(now),
            ))
            .returning(users::balance)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        balance
            .ok_or_else(LedgerError::user_not_found)
            .and_then(stored_money)
    }

    async fn checkout(&self, user_id: UserId, cart: &Cart) -> Result<Receipt, LedgerError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let product_ids: Vec<i64> = cart.product_ids().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let rows: Vec<ProductPriceRow> = products::table
                    .filter(products::id.eq_any(&product_ids))
                    .order(products::id)
                    .select(ProductPriceRow::as_select())
                    .load(conn)
                    .await?;
                let priced = price_cart(cart, &rows)?;
                let total = cart_total(&priced)?;
                let debit = -total.as_decimal();

                let Some(new_balance) = conditional_adjust(conn, user_id, debit).await? else {
                    let error = explain_rejected_update(conn, user_id, debit).await?;
                    return Err(CheckoutFailure::Ledger(error));
                };

                let order_id: i64 = diesel::insert_into(orders::table)
                    .values(&NewOrderRow {
                        user_id: user_id.get(),
                        total_amount: total.as_decimal(),
                        status: ORDER_STATUS_COMPLETED,
                    })
                    .returning(orders::id)
                    .get_result(conn)
                    .await?;

                let items = priced
                    .iter()
                    .map(|(product_id, quantity, unit_price)| {
                        let quantity = i32::try_from(*quantity)
                            .map_err(|_| LedgerError::out_of_range())?;
                        Ok(NewOrderItemRow {
                            order_id,
                            product_id: *product_id,
                            quantity,
                            price_at_purchase: unit_price.as_decimal(),
                        })
                    })
                    .collect::<Result<Vec<_>, LedgerError>>()?;
                diesel::insert_into(order_items::table)
                    .values(&items)
                    .execute(conn)
                    .await?;

                Ok(Receipt {
                    order_id: OrderId::new(order_id),
                    total,
                    new_balance: stored_money(new_balance)?,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_checkout_failure)
    }

    async fn sales_summary(&self) -> Result<SalesSummary, LedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let product_count: i64 = products::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let order_count: i64 = orders::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let revenue: Option<Decimal> = orders::table
            .filter(orders::status.eq(ORDER_STATUS_COMPLETED))
            .select(diesel::dsl::sum(orders::total_amount))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let revenue = match revenue {
            Some(sum) => Money::try_from_decimal(sum).map_err(|_| LedgerError::out_of_range())?,
            None => Money::zero(),
        };
        Ok(SalesSummary {
            products: product_count,
            orders: order_count,
            revenue,
        })
    }
}
