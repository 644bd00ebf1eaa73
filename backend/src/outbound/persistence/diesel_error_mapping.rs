//! Shared Diesel error classification for the storefront repositories.
//!
//! Raw driver messages are logged at `debug` here and never forwarded: each
//! adapter receives a coarse [`DieselFailure`] and turns it into its own port
//! error with a generic message.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse outcome of a failed Diesel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-call.
    Connection,
    /// A unique index rejected the write; carries the index name when known.
    UniqueViolation { constraint: Option<String> },
    /// Any other failure.
    Query(&'static str),
}

/// Classify a Diesel error, logging the driver detail.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(_, _) => DieselFailure::Query("database error"),
        _ => DieselFailure::Query("database error"),
    }
}

/// Extract the message from a pool failure.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DieselError::NotFound, DieselFailure::Query("record not found"))]
    #[case(DieselError::RollbackTransaction, DieselFailure::Query("database error"))]
    fn non_database_errors_are_queries(#[case] error: DieselError, #[case] expected: DieselFailure) {
        assert_eq!(classify_diesel_error(error), expected);
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert_eq!(classify_diesel_error(error), DieselFailure::Connection);
    }

    #[rstest]
    fn unique_violations_are_recognised() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        assert!(matches!(
            classify_diesel_error(error),
            DieselFailure::UniqueViolation { constraint: None }
        ));
    }

    #[rstest]
    fn pool_messages_are_unwrapped() {
        assert_eq!(pool_error_message(PoolError::checkout("timed out")), "timed out");
    }
}
