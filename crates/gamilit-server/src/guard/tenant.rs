//! Tenant guard: the caller must belong to a tenant.

use super::GuardDenial;
use crate::extract::Identity;
use crate::utility::tracing_targets;

pub fn check(identity: Option<&Identity>) -> Result<(), GuardDenial> {
    let Some(identity) = identity else {
        return Err(GuardDenial::Unauthenticated);
    };

    if identity.tenant_id.is_some() {
        return Ok(());
    }

    tracing::debug!(
        target: tracing_targets::AUTHORIZATION,
        principal_id = %identity.subject,
        "caller has no tenant"
    );
    Err(GuardDenial::MissingTenant)
}
