//! Application state, configuration and start-up errors.

mod auth_keys;
mod config;
mod error;
mod state;

pub use crate::service::auth_keys::{AuthKeys, AuthKeysConfig};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::error::{BoxedError, Result, ServiceError, ServiceErrorKind};
pub use crate::service::state::ServiceState;
