//! Middleware for `axum::Router` that authenticates callers and enforces
//! declared route requirements.
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::post;
//! use gamilit_server::guard::{HandlerId, RequirementRegistry};
//! use gamilit_server::middleware::{AuthorizationState, RouterAuthExt, RouterGuardExt};
//! use gamilit_server::service::{AuthKeys, AuthKeysConfig};
//! # use gamilit_postgres::PgClient;
//!
//! const PUBLISH: HandlerId = HandlerId::new("content", "publish");
//!
//! # fn example(registry: RequirementRegistry, pg_client: PgClient) -> anyhow::Result<()> {
//! let auth_keys = AuthKeys::from_config(&AuthKeysConfig::new("secret"))?;
//! let app: Router = Router::new()
//!     .route(
//!         "/content/{contentId}/publish",
//!         post(|| async { "published" })
//!             .guarded(AuthorizationState::new(&registry, PUBLISH, pg_client)),
//!     )
//!     .with_authentication(auth_keys);
//! # Ok(())
//! # }
//! ```

mod authentication;
mod authorization;

pub use authentication::{RouterAuthExt, authenticate};
pub use authorization::{AuthorizationState, RouterGuardExt, authorize};
