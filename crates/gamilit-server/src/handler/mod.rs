//! HTTP error types and response bodies.

mod error;
mod response;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
