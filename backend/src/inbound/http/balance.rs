//! Balance HTTP handlers for the authenticated caller.
//!
//! ```text
//! PUT  /api/auth/profile/balance  {"amount": -10.5}
//! POST /api/auth/checkout         {"items": [{"product_id": 3, "quantity": 1}]}
//! ```
//!
//! Clients never send prices or totals; checkout is priced on the server.

use actix_web::{post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Cart, Money, OrderId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, amount_field, map_cart_error};

/// Signed balance adjustment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AdjustBalanceRequest {
    /// Number or numeric string, at most two decimal places, not zero.
    #[serde(default)]
    #[schema(value_type = f64, example = -10.5)]
    pub amount: Option<Value>,
}

/// New balance after an adjustment.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Always `true`.
    pub success: bool,
    /// Balance after the change.
    #[schema(value_type = f64, example = 989.5)]
    pub new_balance: Money,
}

impl BalanceResponse {
    /// Successful response carrying `new_balance`.
    pub fn new(new_balance: Money) -> Self {
        Self {
            success: true,
            new_balance,
        }
    }
}

/// One cart line as sent by the client.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckoutItem {
    /// Catalogue identifier.
    pub product_id: i64,
    /// Units to buy; must be positive.
    pub quantity: i64,
}

/// Cart submitted for checkout.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckoutRequest {
    /// Cart lines in submission order.
    pub items: Vec<CheckoutItem>,
}

/// Receipt returned after a checkout.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Always `true`.
    pub success: bool,
    /// Identifier of the new order.
    pub order_id: OrderId,
    /// Amount charged.
    #[schema(value_type = f64, example = 59.99)]
    pub total: Money,
    /// Balance after the charge.
    #[schema(value_type = f64, example = 940.01)]
    pub new_balance: Money,
}

/// Apply a signed adjustment to the caller's balance.
///
/// The balance never goes negative; an overdraft is rejected and leaves the
/// balance untouched.
#[utoipa::path(
    put,
    path = "/api/auth/profile/balance",
    request_body = AdjustBalanceRequest,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Non-numeric amount or insufficient funds", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Account no longer exists", body = ErrorEnvelope)
    ),
    tags = ["balance"],
    operation_id = "adjustBalance"
)]
#[put("/auth/profile/balance")]
pub async fn adjust_balance(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AdjustBalanceRequest>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let delta = amount_field(
        payload.amount.as_ref(),
        FieldName::new("amount"),
        Money::delta_from_json,
    )?;
    let balance = state
        .ledger
        .adjust(caller.principal().user_id, delta)
        .await?;
    Ok(web::Json(BalanceResponse::new(balance)))
}

/// Price the cart from the catalogue, debit the caller and record the order.
#[utoipa::path(
    post,
    path = "/api/auth/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order recorded", body = CheckoutResponse),
        (status = 400, description = "Invalid cart or insufficient funds", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Unknown product", body = ErrorEnvelope)
    ),
    tags = ["balance"],
    operation_id = "checkout"
)]
#[post("/auth/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<web::Json<CheckoutResponse>> {
    let cart = Cart::try_from_pairs(
        payload
            .into_inner()
            .items
            .into_iter()
            .map(|item| (item.product_id, item.quantity)),
    )
    .map_err(map_cart_error)?;
    let receipt = state
        .ledger
        .checkout(caller.principal().user_id, cart)
        .await?;
    Ok(web::Json(CheckoutResponse {
        success: true,
        order_id: receipt.order_id,
        total: receipt.total,
        new_balance: receipt.new_balance,
    }))
}
