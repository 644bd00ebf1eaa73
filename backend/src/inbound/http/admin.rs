//! Administration HTTP handlers. Every route requires the `admin` role.
//!
//! ```text
//! GET    /api/admin/stats
//! GET    /api/admin/users
//! PUT    /api/admin/users/{id}/role     {"role": "seller"}
//! PUT    /api/admin/users/{id}/balance  {"balance": 250}
//! DELETE /api/admin/users/{id}
//! ```
//!
//! The path id and the body are taken raw and parsed only after the role
//! check, so a non-admin caller always sees `403` whatever they sent.

use actix_web::{delete, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{AdminStats, Money, Role, User, authorize};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::{SuccessResponse, UserResponse};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::balance::BalanceResponse;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, amount_field, json_body, parse_role, parse_user_id_segment,
};

/// Body of `GET /api/admin/users`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// Always `true`.
    pub success: bool,
    /// Every account, newest first.
    pub users: Vec<User>,
}

/// Body of `GET /api/admin/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Always `true`.
    pub success: bool,
    /// Dashboard counters.
    pub stats: AdminStats,
}

/// Body of `PUT /api/admin/users/{id}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoleRequest {
    /// One of `guest`, `user`, `seller`, `editor` or `admin`.
    #[serde(default)]
    #[schema(example = "seller")]
    pub role: String,
}

/// Body of `PUT /api/admin/users/{id}/balance`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetBalanceRequest {
    /// Absolute, non-negative balance.
    #[serde(default)]
    #[schema(value_type = f64, example = 250.0)]
    pub balance: Option<Value>,
}

fn require_admin(caller: &AuthenticatedUser) -> ApiResult<()> {
    authorize(caller.principal().role, &[Role::Admin])
}

/// Storefront-wide counters.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = StatsResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<StatsResponse>> {
    require_admin(&caller)?;
    let stats = state.admin.stats(caller.principal()).await?;
    Ok(web::Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// List every account, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = UserListResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserListResponse>> {
    require_admin(&caller)?;
    let users = state.admin.list_users(caller.principal()).await?;
    Ok(web::Json(UserListResponse {
        success: true,
        users,
    }))
}

/// Change a user's role. The target's existing tokens stop working.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = i64, Path, description = "Target user id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Unknown role or malformed id", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Not an admin, or the target is the superadmin", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "adminSetRole"
)]
#[put("/admin/users/{id}/role")]
pub async fn set_role(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<UserResponse>> {
    require_admin(&caller)?;
    let target = parse_user_id_segment(&path)?;
    let payload: RoleRequest = json_body(&body)?;
    let role = parse_role(&payload.role)?;
    let user = state
        .admin
        .set_role(caller.principal(), target, role)
        .await?;
    Ok(web::Json(UserResponse {
        success: true,
        user,
    }))
}

/// Overwrite a user's balance.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/balance",
    params(("id" = i64, Path, description = "Target user id")),
    request_body = SetBalanceRequest,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Negative or non-numeric balance", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "adminSetBalance"
)]
#[put("/admin/users/{id}/balance")]
pub async fn set_balance(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<BalanceResponse>> {
    require_admin(&caller)?;
    let target = parse_user_id_segment(&path)?;
    let payload: SetBalanceRequest = json_body(&body)?;
    let value = amount_field(
        payload.balance.as_ref(),
        FieldName::new("balance"),
        Money::from_json,
    )?;
    let balance = state
        .admin
        .set_balance(caller.principal(), target, value)
        .await?;
    Ok(web::Json(BalanceResponse::new(balance)))
}

/// Delete an account and its orders.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 200, description = "Account deleted", body = SuccessResponse),
        (status = 400, description = "Malformed id", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Not an admin, or the target is the superadmin", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessResponse>> {
    require_admin(&caller)?;
    let target = parse_user_id_segment(&path)?;
    state.admin.delete_user(caller.principal(), target).await?;
    Ok(web::Json(SuccessResponse::ok()))
}
