//! Domain primitives, ports and services.
//!
//! Purpose: keep storefront rules (credentials, roles, balances, checkout)
//! independent of HTTP and PostgreSQL. Adapters depend on this module, never
//! the other way round.
//!
//! Public surface:
//! - Error and ErrorCode: transport-agnostic failure with a stable code.
//! - User, Role, Money, Cart: validated value types.
//! - Services: `AccountService`, `SessionService`, `LedgerService` and
//!   `AdminService`, each generic over the driven ports it needs.

pub mod account_service;
pub mod admin_service;
pub mod auth;
pub mod authorization;
pub mod checkout;
pub mod error;
pub mod ledger_service;
pub mod money;
pub(crate) mod port_error_mapping;
pub mod ports;
pub mod profile;
pub mod session_service;
pub mod stats;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, STARTING_BALANCE_MINOR};
pub use self::admin_service::AdminService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN, PasswordHash, Registration,
};
pub use self::authorization::{AccountMutation, authorize, ensure_superadmin_mutation_allowed};
pub use self::checkout::{Cart, CartLine, CartValidationError, OrderId, ProductId, Receipt};
pub use self::error::{Error, ErrorCode};
pub use self::ledger_service::LedgerService;
pub use self::money::{MONEY_MAX_MINOR, MONEY_SCALE, Money, MoneyValidationError};
pub use self::profile::{
    ProfileChanges, ProfileUpdate, ProfileValidationError, validate_avatar_url,
};
pub use self::session_service::SessionService;
pub use self::stats::{ACTIVE_WINDOW_DAYS, AdminStats, SalesSummary, SignupCounts, StatsWindow};
pub use self::token::{Claims, IssuedToken, Principal, TokenError, TokenSubject};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, Role, SUPERADMIN_ID, USERNAME_MAX, USERNAME_MIN, User, UserId, UserProfile,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use storefront::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
