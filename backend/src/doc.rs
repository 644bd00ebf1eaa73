//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the error envelope schema and the
//! bearer token security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AdminStats, Claims, ErrorCode, Role, User, UserProfile};
use crate::inbound::http::accounts::{
    AvatarRequest, AvatarResponse, ClaimsResponse, LoginRequest, RegisterRequest,
    SessionResponse, SuccessResponse, UserResponse,
};
use crate::inbound::http::admin::{
    RoleRequest, SetBalanceRequest, StatsResponse, UserListResponse,
};
use crate::inbound::http::balance::{
    AdjustBalanceRequest, BalanceResponse, CheckoutItem, CheckoutRequest, CheckoutResponse,
};
use crate::inbound::http::error::ErrorEnvelope;

/// Name of the bearer security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 token returned by POST /api/auth/register or /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront account API",
        description = "Accounts, sessions, balances and administration for the game storefront."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::verify,
        crate::inbound::http::accounts::get_profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::update_avatar,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::balance::adjust_balance,
        crate::inbound::http::balance::checkout,
        crate::inbound::http::admin::stats,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::set_role,
        crate::inbound::http::admin::set_balance,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCode,
        User,
        UserProfile,
        Role,
        Claims,
        RegisterRequest,
        LoginRequest,
        AvatarRequest,
        SessionResponse,
        ClaimsResponse,
        UserResponse,
        AvatarResponse,
        SuccessResponse,
        AdjustBalanceRequest,
        BalanceResponse,
        CheckoutItem,
        CheckoutRequest,
        CheckoutResponse,
        RoleRequest,
        SetBalanceRequest,
        UserListResponse,
        AdminStats,
        StatsResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and the caller's own account"),
        (name = "balance", description = "Balance adjustments and checkout"),
        (name = "admin", description = "Administrative account management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
