//! Authenticated caller attached to a request.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PermissionSet;
use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets;

/// Decoded token claims of the caller.
///
/// Inserted into the request extensions by the [`authenticate`] middleware and
/// read-only afterwards. Guards receive it as an explicit `Option<&Identity>`.
///
/// As an extractor, `Identity` rejects anonymous requests with `403 Forbidden`,
/// while `Option<Identity>` never rejects.
///
/// [`authenticate`]: crate::middleware::authenticate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Account identifier.
    #[serde(rename = "sub")]
    pub subject: Uuid,
    pub email: String,
    /// Role name, matched exactly.
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl Identity {
    /// Default lifetime used by [`Identity::new`].
    const DEFAULT_LIFETIME: SignedDuration = SignedDuration::from_hours(1);

    /// Creates an identity issued now, without permissions or tenant.
    pub fn new(subject: Uuid, email: impl Into<String>, role: impl Into<String>) -> Self {
        let issued_at = Timestamp::now();
        Self {
            subject,
            email: email.into(),
            role: role.into(),
            permissions: None,
            tenant_id: None,
            issued_at,
            expires_at: issued_at
                .checked_add(Self::DEFAULT_LIFETIME)
                .unwrap_or(Timestamp::MAX),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().collect());
        self
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = expires_at;
        self
    }

    #[inline]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Returns whether `permission` is granted. An absent set grants nothing.
    #[inline]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|set| set.contains(permission))
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(identity) => Ok(identity.clone()),
            None => {
                tracing::debug!(
                    target: tracing_targets::AUTHORIZATION,
                    path = %parts.uri.path(),
                    "identity required but request is anonymous"
                );
                Err(ErrorKind::Forbidden.with_context("request is not authenticated"))
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned())
    }
}
