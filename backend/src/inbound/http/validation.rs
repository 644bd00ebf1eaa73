//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every client-side validation failure becomes an `invalid_request` error
//! whose details name the offending field and a stable code.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{
    CartValidationError, CredentialsValidationError, Error, Money, MoneyValidationError, Role,
    UserId, UserValidationError,
};

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn map_credentials_error(error: CredentialsValidationError) -> Error {
    let (field, code) = match &error {
        CredentialsValidationError::InvalidEmail => ("email", "invalid_email"),
        CredentialsValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        CredentialsValidationError::InvalidUsername(_) => ("username", "invalid_username"),
    };
    field_error(field, code, error.to_string())
}

pub(crate) fn map_money_error(field: FieldName, error: MoneyValidationError) -> Error {
    let code = match error {
        MoneyValidationError::NotNumeric => "not_numeric",
        MoneyValidationError::TooPrecise => "too_precise",
        MoneyValidationError::Negative => "negative_amount",
        MoneyValidationError::Zero => "zero_amount",
        MoneyValidationError::OutOfRange => "amount_out_of_range",
    };
    let field = field.as_str();
    field_error(field, code, format!("{field}: {error}"))
}

pub(crate) fn map_cart_error(error: CartValidationError) -> Error {
    let (field, code) = match error {
        CartValidationError::Empty => ("items", "empty_cart"),
        CartValidationError::InvalidProductId => ("product_id", "invalid_product_id"),
        CartValidationError::InvalidQuantity => ("quantity", "invalid_quantity"),
    };
    field_error(field, code, error.to_string())
}

/// Parse a role name from a request body.
pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.trim()
        .to_ascii_lowercase()
        .parse::<Role>()
        .map_err(|error: UserValidationError| {
            Error::invalid_request(error.to_string()).with_details(json!({
                "field": "role",
                "value": raw,
                "code": "invalid_role",
            }))
        })
}

fn invalid_user_id(message: impl Into<String>, raw: Value) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": "id",
        "value": raw,
        "code": "invalid_user_id",
    }))
}

/// Validate a numeric user id.
pub(crate) fn parse_user_id(raw: i64) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|error| invalid_user_id(error.to_string(), json!(raw)))
}

/// Parse the raw `{id}` segment of an administration path.
///
/// Handlers take the segment as a string so the role gate runs before any
/// parsing can reject the request.
pub(crate) fn parse_user_id_segment(raw: &str) -> Result<UserId, Error> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| invalid_user_id("path parameter is not valid", json!(raw)))?;
    parse_user_id(id)
}

/// Read an amount field, treating a missing key like a non-numeric value.
pub(crate) fn amount_field(
    value: Option<&Value>,
    field: FieldName,
    parse: fn(&Value) -> Result<Money, MoneyValidationError>,
) -> Result<Money, Error> {
    let value = value.unwrap_or(&Value::Null);
    parse(value).map_err(|error| map_money_error(field, error))
}

fn malformed_body(message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": "malformed_body" }))
}

fn rejected_payload(error: &JsonPayloadError) -> Error {
    debug!(%error, "rejected request body");
    let message = match error {
        JsonPayloadError::Deserialize(inner) => inner.to_string(),
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        _ => "request body is not valid JSON".to_owned(),
    };
    malformed_body(message)
}

/// Decode a JSON body that was read as raw bytes.
///
/// An empty body decodes as `{}` so missing fields surface as field errors.
pub(crate) fn json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|error| {
        debug!(%error, "rejected request body");
        malformed_body(error.to_string())
    })
}

/// JSON extractor configuration returning the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|error, _req: &HttpRequest| rejected_payload(&error).into())
}
