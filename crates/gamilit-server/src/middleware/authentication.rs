//! Authentication middleware for attaching the caller's identity.
//!
//! Requests without an `Authorization` header pass through anonymously; the
//! guards decide whether that is acceptable for the matched route. A header
//! that is present but not a valid bearer token fails with `401`.

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::{TypedHeaderRejection, TypedHeaderRejectionReason};

use crate::handler::{ErrorKind, Result};
use crate::service::AuthKeys;
use crate::utility::tracing_targets;

/// Extension trait for `axum::`[`Router`] to apply authentication middleware.
pub trait RouterAuthExt<S> {
    /// Decodes bearer tokens into an [`Identity`] for every route.
    ///
    /// Layer this outside of [`guarded`] so the identity is attached before
    /// any guard runs.
    ///
    /// [`Identity`]: crate::extract::Identity
    /// [`guarded`]: crate::middleware::RouterGuardExt::guarded
    fn with_authentication(self, auth_keys: AuthKeys) -> Self;
}

impl<S> RouterAuthExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_authentication(self, auth_keys: AuthKeys) -> Self {
        self.layer(from_fn_with_state(auth_keys, authenticate))
    }
}

/// Verifies the bearer token, if any, and stores the decoded identity in the
/// request extensions.
pub async fn authenticate(
    State(auth_keys): State<AuthKeys>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let TypedHeader(Authorization(bearer)) = match bearer {
        Ok(bearer) => bearer,
        Err(rejection) => match rejection.reason() {
            TypedHeaderRejectionReason::Missing => return Ok(next.run(request).await),
            _ => {
                tracing::debug!(
                    target: tracing_targets::AUTHENTICATION,
                    error = %rejection,
                    "malformed authorization header"
                );
                return Err(ErrorKind::MalformedAuthToken
                    .with_message("Invalid token format")
                    .with_context("Authorization header must contain a valid Bearer token")
                    .with_resource("authentication"));
            }
        },
    };

    let identity = auth_keys.decode_identity(bearer.token())?;

    tracing::trace!(
        target: tracing_targets::AUTHENTICATION,
        principal_id = %identity.subject,
        role = %identity.role,
        "request authenticated"
    );

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
