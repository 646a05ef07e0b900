//! Database failures mapped to HTTP errors.
//!
//! Every variant becomes an opaque `500`. Details go to the log only.

use gamilit_postgres::PgError;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets;

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match &error {
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: tracing_targets::POSTGRES,
                    timeout = ?timeout,
                    "database timeout"
                );
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: tracing_targets::POSTGRES,
                    error = %connection_error,
                    "database connection error"
                );
            }
            PgError::Query(query_error) => {
                tracing::error!(
                    target: tracing_targets::POSTGRES,
                    error = %query_error,
                    "database query error"
                );
            }
            other => {
                tracing::error!(
                    target: tracing_targets::POSTGRES,
                    error = %other,
                    transient = other.is_transient(),
                    "database error"
                );
            }
        }

        ErrorKind::InternalServerError.with_context(error.to_string())
    }
}
