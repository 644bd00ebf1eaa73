//! Shared mapping from driven-port failures to transport-safe domain errors.
//!
//! Infrastructure messages are logged at `debug` and replaced by generic
//! text before they reach an [`Error`].

use serde_json::json;
use tracing::debug;

use super::ports::{LedgerError, PasswordHashError, TokenIssueError, UserPersistenceError};
use super::Error;

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            debug!(%message, "user repository unavailable");
            Error::service_unavailable("database unavailable")
        }
        UserPersistenceError::Query { message } => {
            debug!(%message, "user repository query failed");
            Error::internal("user repository error")
        }
        UserPersistenceError::DuplicateEmail => Error::invalid_request("email already registered")
            .with_details(json!({ "field": "email", "code": "email_taken" })),
        UserPersistenceError::DuplicateUsername => Error::invalid_request("username already taken")
            .with_details(json!({ "field": "username", "code": "username_taken" })),
    }
}

pub(crate) fn map_ledger_error(error: LedgerError) -> Error {
    match error {
        LedgerError::Connection { message } => {
            debug!(%message, "ledger unavailable");
            Error::service_unavailable("database unavailable")
        }
        LedgerError::Query { message } => {
            debug!(%message, "ledger query failed");
            Error::internal("ledger error")
        }
        LedgerError::UserNotFound => Error::not_found("user not found"),
        LedgerError::InsufficientFunds => Error::invalid_request("insufficient funds")
            .with_details(json!({ "code": "insufficient_funds" })),
        LedgerError::ProductNotFound { product_id } => {
            Error::not_found(format!("product {product_id} not found"))
                .with_details(json!({ "field": "product_id", "value": product_id }))
        }
        LedgerError::OutOfRange => Error::invalid_request("amount out of range")
            .with_details(json!({ "code": "amount_out_of_range" })),
    }
}

pub(crate) fn map_password_hash_error(error: PasswordHashError) -> Error {
    debug!(error = %error, "password hashing failed");
    Error::internal("password hashing failed")
}

pub(crate) fn map_token_issue_error(error: TokenIssueError) -> Error {
    debug!(error = %error, "token signing failed");
    Error::internal("token signing failed")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate_email(), ErrorCode::InvalidRequest)]
    #[case(UserPersistenceError::duplicate_username(), ErrorCode::InvalidRequest)]
    fn user_errors_map_to_codes(#[case] error: UserPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(map_user_persistence_error(error).code(), code);
    }

    #[rstest]
    fn raw_messages_do_not_leak() {
        let mapped = map_user_persistence_error(UserPersistenceError::connection(
            "password authentication failed for user postgres",
        ));
        assert!(!mapped.message().contains("postgres"));
    }

    #[rstest]
    fn duplicates_carry_detail_codes() {
        let mapped = map_user_persistence_error(UserPersistenceError::duplicate_email());
        assert_eq!(
            mapped.details(),
            Some(&json!({ "field": "email", "code": "email_taken" }))
        );
    }

    #[rstest]
    #[case(LedgerError::user_not_found(), ErrorCode::NotFound)]
    #[case(LedgerError::insufficient_funds(), ErrorCode::InvalidRequest)]
    #[case(LedgerError::product_not_found(4_i64), ErrorCode::NotFound)]
    #[case(LedgerError::out_of_range(), ErrorCode::InvalidRequest)]
    #[case(LedgerError::connection("down"), ErrorCode::ServiceUnavailable)]
    fn ledger_errors_map_to_codes(#[case] error: LedgerError, #[case] code: ErrorCode) {
        assert_eq!(map_ledger_error(error).code(), code);
    }

    #[rstest]
    fn insufficient_funds_is_tagged() {
        let mapped = map_ledger_error(LedgerError::insufficient_funds());
        assert_eq!(mapped.details(), Some(&json!({ "code": "insufficient_funds" })));
    }
}
