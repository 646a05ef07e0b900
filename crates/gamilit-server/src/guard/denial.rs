use gamilit_postgres::PgError;
use uuid::Uuid;

/// Why a guard refused a request.
///
/// The `Display` output is for logs; clients only see the generic body of the
/// HTTP error this converts into.
#[derive(Debug, thiserror::Error)]
pub enum GuardDenial {
    /// No identity is attached to the request.
    #[error("request is not authenticated")]
    Unauthenticated,

    /// The caller's role is not among the allowed roles.
    #[error("role '{role}' is not allowed")]
    InsufficientRole { role: String },

    /// A required permission is not granted.
    #[error("permission '{permission}' is not granted")]
    MissingPermission { permission: String },

    /// The route needs a tenant and the caller has none.
    #[error("caller has no tenant")]
    MissingTenant,

    /// No active ownership fact exists for the pair.
    #[error("principal {principal} does not own resource {resource}")]
    NotOwner { principal: Uuid, resource: Uuid },

    /// The route does not capture the parameter the ownership check needs.
    #[error("path parameter '{param}' is missing")]
    MissingPathParam { param: String },

    /// The captured parameter is not a valid resource identifier.
    #[error("path parameter '{param}' is not a valid identifier")]
    InvalidPathParam { param: String },

    /// The ownership store failed.
    #[error("ownership lookup failed: {0}")]
    Infrastructure(#[from] PgError),
}

impl GuardDenial {
    /// Returns whether this denial is a routine access decision rather than a
    /// malformed request or a failure.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::InsufficientRole { .. }
                | Self::MissingPermission { .. }
                | Self::MissingTenant
                | Self::NotOwner { .. }
        )
    }
}
