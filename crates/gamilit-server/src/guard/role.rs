//! Role guard: the caller's role must be one of the allowed roles.

use super::GuardDenial;
use crate::extract::Identity;
use crate::utility::tracing_targets;

/// Checks `identity` against the allowed roles.
///
/// No declared roles allow everyone, including anonymous callers. Roles are
/// compared exactly, without hierarchy or wildcards.
pub fn check(allowed: &[String], identity: Option<&Identity>) -> Result<(), GuardDenial> {
    if allowed.is_empty() {
        return Ok(());
    }

    let Some(identity) = identity else {
        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            "role check on anonymous request"
        );
        return Err(GuardDenial::Unauthenticated);
    };

    if allowed.iter().any(|role| identity.has_role(role)) {
        return Ok(());
    }

    tracing::debug!(
        target: tracing_targets::AUTHORIZATION,
        principal_id = %identity.subject,
        role = %identity.role,
        "role is not allowed"
    );

    Err(GuardDenial::InsufficientRole {
        role: identity.role.clone(),
    })
}
