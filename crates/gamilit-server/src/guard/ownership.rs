//! Ownership guard: the caller must administer the addressed resource.
//!
//! The check is a single primary-key read without row locks. A revocation that
//! commits while a request is between this check and its handler does not
//! affect that request; the next request observes it.

use std::future::Future;

use gamilit_postgres::query::TeacherClassroomRepository;
use gamilit_postgres::{PgClient, PgResult};
use uuid::Uuid;

use super::{GuardDenial, OwnershipRequirement};
use crate::extract::{Identity, PathParams};
use crate::utility::tracing_targets;

/// Source of ownership facts.
pub trait OwnershipStore: Send + Sync {
    /// Returns whether `principal` has an active association with `resource`.
    fn is_active_owner(
        &self,
        principal: Uuid,
        resource: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl OwnershipStore for PgClient {
    async fn is_active_owner(&self, principal: Uuid, resource: Uuid) -> PgResult<bool> {
        let mut conn = self.get_connection().await?;
        let fact = conn
            .find_active_teacher_classroom(principal, resource)
            .await?;
        Ok(fact.is_some())
    }
}

/// Checks that the caller owns the resource named by the requirement's path
/// parameter.
///
/// The store is not queried for anonymous callers or malformed parameters.
pub async fn check<S>(
    requirement: &OwnershipRequirement,
    identity: Option<&Identity>,
    params: &PathParams,
    store: &S,
) -> Result<(), GuardDenial>
where
    S: OwnershipStore + ?Sized,
{
    let Some(identity) = identity else {
        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            param = requirement.param(),
            "ownership check on anonymous request"
        );
        return Err(GuardDenial::Unauthenticated);
    };

    let param = requirement.param();
    let Some(raw) = params.get(param) else {
        tracing::warn!(
            target: tracing_targets::AUTHORIZATION,
            param,
            "route does not capture the ownership parameter"
        );
        return Err(GuardDenial::MissingPathParam {
            param: param.to_owned(),
        });
    };

    let Ok(resource) = Uuid::parse_str(raw) else {
        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            param,
            "ownership parameter is not a valid identifier"
        );
        return Err(GuardDenial::InvalidPathParam {
            param: param.to_owned(),
        });
    };

    let principal = identity.subject;
    match store.is_active_owner(principal, resource).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::info!(
                target: tracing_targets::AUTHORIZATION,
                principal_id = %principal,
                resource_id = %resource,
                "caller does not own the resource"
            );
            Err(GuardDenial::NotOwner {
                principal,
                resource,
            })
        }
        Err(error) => {
            tracing::error!(
                target: tracing_targets::AUTHORIZATION,
                principal_id = %principal,
                resource_id = %resource,
                error = %error,
                "ownership lookup failed"
            );
            Err(GuardDenial::Infrastructure(error))
        }
    }
}
