//! HTTP error type and conversions from lower-level failures.

mod guard_error;
mod http_error;
mod jwt_error;
mod pg_error;

pub use http_error::{Error, ErrorKind, Result};
