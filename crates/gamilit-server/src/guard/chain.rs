//! Ordered guard pipeline for a single route.

use super::{GuardDenial, OwnershipRequirement, OwnershipStore, RouteRequirements};
use super::{ownership, permission, role, tenant};
use crate::extract::{Identity, PathParams};
use crate::utility::tracing_targets;

/// One check in a [`GuardChain`].
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GuardStep {
    /// Caller must hold any one of the roles.
    Role(Vec<String>),
    /// Caller must hold every permission.
    Permission(Vec<String>),
    /// Caller must belong to a tenant.
    Tenant,
    /// Caller must own the resource in the path.
    Ownership(OwnershipRequirement),
}

impl GuardStep {
    /// Short name used in logs.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    async fn run<S>(
        &self,
        identity: Option<&Identity>,
        params: &PathParams,
        store: &S,
    ) -> Result<(), GuardDenial>
    where
        S: OwnershipStore + ?Sized,
    {
        match self {
            Self::Role(allowed) => role::check(allowed, identity),
            Self::Permission(required) => permission::check(required, identity),
            Self::Tenant => tenant::check(identity),
            Self::Ownership(requirement) => {
                ownership::check(requirement, identity, params, store).await
            }
        }
    }
}

/// Result of evaluating a chain.
#[derive(Debug)]
#[must_use]
pub enum GuardOutcome {
    Allowed,
    Denied(GuardDenial),
}

impl GuardOutcome {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn into_result(self) -> Result<(), GuardDenial> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(denial) => Err(denial),
        }
    }
}

/// Guards for a route, cheapest first.
///
/// Role and permission checks are in-memory; the ownership lookup is the only
/// step that touches the store and always runs last. Evaluation stops at the
/// first denial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardChain {
    steps: Vec<GuardStep>,
}

impl GuardChain {
    pub fn from_requirements(requirements: &RouteRequirements) -> Self {
        if requirements.is_public() {
            return Self::default();
        }

        let mut steps = vec![
            GuardStep::Role(requirements.roles().to_vec()),
            GuardStep::Permission(requirements.permissions().to_vec()),
        ];

        if requirements.requires_tenant() {
            steps.push(GuardStep::Tenant);
        }

        if let Some(ownership) = requirements.ownership() {
            steps.push(GuardStep::Ownership(ownership.clone()));
        }

        Self { steps }
    }

    #[inline]
    pub fn steps(&self) -> &[GuardStep] {
        &self.steps
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order until one denies.
    pub async fn evaluate<S>(
        &self,
        identity: Option<&Identity>,
        params: &PathParams,
        store: &S,
    ) -> GuardOutcome
    where
        S: OwnershipStore + ?Sized,
    {
        for step in &self.steps {
            if let Err(denial) = step.run(identity, params, store).await {
                tracing::debug!(
                    target: tracing_targets::AUTHORIZATION,
                    guard = step.name(),
                    reason = %denial,
                    "guard denied request"
                );
                return GuardOutcome::Denied(denial);
            }
        }

        GuardOutcome::Allowed
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::guard::mock::MockOwnershipStore;

    const TEACHER: Uuid = Uuid::from_u128(0x7ea);
    const STUDENT: Uuid = Uuid::from_u128(0x5d);
    const CLASSROOM_42: Uuid = Uuid::from_u128(42);
    const CLASSROOM_99: Uuid = Uuid::from_u128(99);

    fn block_student() -> RouteRequirements {
        RouteRequirements::new()
            .with_roles(["teacher", "admin"])
            .with_ownership("classroomId")
    }

    fn classroom(id: Uuid) -> PathParams {
        [("classroomId", id.to_string())].into_iter().collect()
    }

    #[test]
    fn steps_follow_declaration_kinds() {
        let chain = GuardChain::from_requirements(&block_student().with_tenant());
        let names: Vec<_> = chain.steps().iter().map(GuardStep::name).collect();
        assert_eq!(names, ["role", "permission", "tenant", "ownership"]);

        let chain = GuardChain::from_requirements(&RouteRequirements::new());
        let names: Vec<_> = chain.steps().iter().map(GuardStep::name).collect();
        assert_eq!(names, ["role", "permission"]);
    }

    #[test]
    fn public_routes_have_no_guards() {
        let requirements = RouteRequirements::public().with_ownership("classroomId");
        assert!(GuardChain::from_requirements(&requirements).is_empty());
    }

    #[tokio::test]
    async fn undeclared_routes_allow_anonymous_callers() {
        let store = MockOwnershipStore::new();
        let chain = GuardChain::from_requirements(&RouteRequirements::new());

        let outcome = chain.evaluate(None, &PathParams::new(), &store).await;
        assert!(outcome.is_allowed());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn role_denial_skips_the_ownership_lookup() {
        let store = MockOwnershipStore::new().with_fact(STUDENT, CLASSROOM_42);
        let student = Identity::new(STUDENT, "student@gamilit.com", "student");
        let chain = GuardChain::from_requirements(&block_student());

        let outcome = chain
            .evaluate(Some(&student), &classroom(CLASSROOM_42), &store)
            .await;

        assert!(matches!(
            outcome,
            GuardOutcome::Denied(GuardDenial::InsufficientRole { .. })
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn permission_denial_skips_the_ownership_lookup() {
        let store = MockOwnershipStore::new().with_fact(TEACHER, CLASSROOM_42);
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher")
            .with_permissions(["classroom:read"]);
        let requirements = block_student().with_permissions(["classroom:manage"]);
        let chain = GuardChain::from_requirements(&requirements);

        let outcome = chain
            .evaluate(Some(&teacher), &classroom(CLASSROOM_42), &store)
            .await;

        assert!(matches!(
            outcome.into_result(),
            Err(GuardDenial::MissingPermission { ref permission }) if permission == "classroom:manage"
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn teacher_of_another_classroom_is_denied_after_one_lookup() {
        let store = MockOwnershipStore::new().with_fact(TEACHER, CLASSROOM_42);
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let chain = GuardChain::from_requirements(&block_student());

        let outcome = chain
            .evaluate(Some(&teacher), &classroom(CLASSROOM_99), &store)
            .await;

        assert!(matches!(
            outcome,
            GuardOutcome::Denied(GuardDenial::NotOwner { .. })
        ));
        assert_eq!(store.queries(), vec![(TEACHER, CLASSROOM_99)]);
    }

    #[tokio::test]
    async fn anonymous_caller_is_denied_without_lookup() {
        let store = MockOwnershipStore::new();
        let chain = GuardChain::from_requirements(
            &RouteRequirements::new().with_ownership("classroomId"),
        );

        let outcome = chain.evaluate(None, &classroom(CLASSROOM_42), &store).await;

        assert!(matches!(
            outcome,
            GuardOutcome::Denied(GuardDenial::Unauthenticated)
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let store = MockOwnershipStore::new().with_fact(TEACHER, CLASSROOM_42);
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let chain = GuardChain::from_requirements(&block_student());
        let params = classroom(CLASSROOM_42);

        for _ in 0..3 {
            let outcome = chain.evaluate(Some(&teacher), &params, &store).await;
            assert!(outcome.is_allowed());
        }
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn revocation_applies_to_the_next_evaluation() {
        let store = MockOwnershipStore::new().with_fact(TEACHER, CLASSROOM_42);
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let chain = GuardChain::from_requirements(&block_student());
        let params = classroom(CLASSROOM_42);

        assert!(chain.evaluate(Some(&teacher), &params, &store).await.is_allowed());
        store.revoke(TEACHER, CLASSROOM_42);
        assert!(!chain.evaluate(Some(&teacher), &params, &store).await.is_allowed());
    }
}
