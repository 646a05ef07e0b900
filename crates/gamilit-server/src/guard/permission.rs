//! Permission guard: every required permission must be granted.

use super::GuardDenial;
use crate::extract::Identity;
use crate::utility::tracing_targets;

/// Checks `identity` against the required permissions (AND semantics).
///
/// No declared permissions allow everyone, even without an identity.
pub fn check(required: &[String], identity: Option<&Identity>) -> Result<(), GuardDenial> {
    if required.is_empty() {
        return Ok(());
    }

    let Some(identity) = identity else {
        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            "permission check on anonymous request"
        );
        return Err(GuardDenial::Unauthenticated);
    };

    let missing = required
        .iter()
        .find(|permission| !identity.has_permission(permission));

    match missing {
        None => Ok(()),
        Some(permission) => {
            tracing::debug!(
                target: tracing_targets::AUTHORIZATION,
                principal_id = %identity.subject,
                permission = %permission,
                "required permission is not granted"
            );
            Err(GuardDenial::MissingPermission {
                permission: permission.clone(),
            })
        }
    }
}
