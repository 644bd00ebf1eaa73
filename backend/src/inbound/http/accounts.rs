//! Account HTTP handlers.
//!
//! ```text
//! POST /api/auth/register        {"email","password","username"}
//! POST /api/auth/login           {"email","password"}
//! GET  /api/auth/verify
//! GET  /api/auth/profile
//! PUT  /api/auth/profile         partial profile
//! POST /api/auth/profile/avatar  {"avatar_url"}
//! POST /api/auth/logout
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AuthSession;
use crate::domain::{Claims, LoginCredentials, ProfileUpdate, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_credentials_error;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email, unique across accounts.
    #[schema(example = "player@example.com")]
    pub email: String,
    /// Plaintext password, at least six characters.
    #[schema(example = "secret1")]
    pub password: String,
    /// Display name.
    #[schema(example = "player_one")]
    pub username: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Login email, unique across accounts.
    #[schema(example = "player@example.com")]
    pub email: String,
    /// Plaintext password.
    #[schema(example = "secret1")]
    pub password: String,
}

/// Avatar update request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarRequest {
    /// New avatar location.
    #[schema(example = "https://cdn.example.com/avatars/42.png")]
    pub avatar_url: String,
}

/// Token and account returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Always `true`.
    pub success: bool,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The account.
    pub user: User,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            success: true,
            token: session.token.token,
            user: session.user,
        }
    }
}

/// Claims carried by the caller's token.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimsResponse {
    /// Always `true`.
    pub success: bool,
    /// Decoded token claims.
    pub claims: Claims,
}

/// Single account payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Always `true`.
    pub success: bool,
    /// The account.
    pub user: User,
}

/// Stored avatar location.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// Always `true`.
    pub success: bool,
    /// Avatar location.
    pub avatar_url: String,
}

/// Bare acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    /// Acknowledgement with `success: true`.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Create an account with the starting credit and open a session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid payload or email taken", body = ErrorEnvelope),
        (status = 503, description = "Database unavailable", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let RegisterRequest {
        email,
        password,
        username,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &password, &username)
        .map_err(map_credentials_error)?;
    let session = state.accounts.register(registration).await?;
    Ok(web::Json(session.into()))
}

/// Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Invalid payload", body = ErrorEnvelope),
        (status = 401, description = "Invalid email or password", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_credentials_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(session.into()))
}

/// Echo the verified claims of the presented token.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is current", body = ClaimsResponse),
        (status = 401, description = "Missing, invalid, expired or revoked token", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "verifyToken"
)]
#[get("/auth/verify")]
pub async fn verify(caller: AuthenticatedUser) -> web::Json<ClaimsResponse> {
    web::Json(ClaimsResponse {
        success: true,
        claims: caller.0.claims,
    })
}

/// Return the caller's account.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Account no longer exists", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "getProfile"
)]
#[get("/auth/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.profiles.profile(caller.principal().user_id).await?;
    Ok(web::Json(UserResponse {
        success: true,
        user,
    }))
}

/// Apply a partial profile update. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Validation failure or unknown field", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ProfileUpdate>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .accounts
        .update_profile(caller.principal().user_id, payload.into_inner())
        .await?;
    Ok(web::Json(UserResponse {
        success: true,
        user,
    }))
}

/// Replace the caller's avatar URL.
#[utoipa::path(
    post,
    path = "/api/auth/profile/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Empty or oversized URL", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "updateAvatar"
)]
#[post("/auth/profile/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let avatar_url = state
        .accounts
        .update_avatar(caller.principal().user_id, payload.into_inner().avatar_url)
        .await?;
    Ok(web::Json(AvatarResponse {
        success: true,
        avatar_url,
    }))
}

/// Revoke every token issued to the caller.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Tokens revoked", body = SuccessResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<SuccessResponse>> {
    state.accounts.logout(caller.principal().user_id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
