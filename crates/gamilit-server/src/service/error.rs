//! Service layer error types.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed error used as the source of a [`ServiceError`].
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service start-up and configuration.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Category of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    /// Invalid or missing configuration.
    Config,
    /// A backing service (database) failed.
    External,
    /// Anything else.
    Internal,
}

impl ServiceErrorKind {
    /// Returns the kind as a stable string for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while assembling the [`ServiceState`].
///
/// Request-time failures use the HTTP [`Error`] instead.
///
/// [`ServiceState`]: crate::service::ServiceState
/// [`Error`]: crate::handler::Error
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct ServiceError {
    kind: ServiceErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl ServiceError {
    #[inline]
    fn new(kind: ServiceErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ServiceErrorKind::Config, message)
    }

    /// Creates an error for a failing backing service.
    pub fn external(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let message = format!("{}: {}", service.into(), message.into());
        Self::new(ServiceErrorKind::External, message)
    }

    /// Creates an internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ServiceErrorKind::Internal, message)
    }

    /// Attaches the underlying cause.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub const fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use gamilit_postgres::PgError;

    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = ServiceError::config("auth secret is empty");
        assert_eq!(error.kind(), ServiceErrorKind::Config);
        assert_eq!(error.to_string(), "config error: auth secret is empty");
    }

    #[test]
    fn external_errors_keep_their_source() {
        let error = ServiceError::external("postgres", "failed to apply migrations")
            .with_source(PgError::Config("bad url".into()));

        assert_eq!(error.kind(), ServiceErrorKind::External);
        assert_eq!(error.message(), "postgres: failed to apply migrations");
        assert!(error.source().is_some());
    }
}
