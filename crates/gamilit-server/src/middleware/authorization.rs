//! Authorization middleware for enforcing declared route requirements.
//!
//! The guard chain of a handler is resolved once, when the route is wired, and
//! evaluated on every request against the caller's identity and the matched
//! path parameters.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::extract::{Identity, PathParams};
use crate::guard::{GuardChain, HandlerId, OwnershipStore, RequirementRegistry};
use crate::handler::{Error, Result};
use crate::utility::tracing_targets;

/// Resolved guard chain of one handler, with the store ownership checks use.
#[derive(Debug, Clone)]
pub struct AuthorizationState<O> {
    chain: Arc<GuardChain>,
    handler: HandlerId,
    store: O,
}

impl<O> AuthorizationState<O> {
    /// Resolves the requirements declared for `handler`.
    pub fn new(registry: &RequirementRegistry, handler: HandlerId, store: O) -> Self {
        let chain = GuardChain::from_requirements(&registry.read(handler));

        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            handler = %handler,
            guards = chain.steps().len(),
            "guard chain resolved"
        );

        Self {
            chain: Arc::new(chain),
            handler,
            store,
        }
    }

    #[inline]
    pub fn chain(&self) -> &GuardChain {
        &self.chain
    }

    #[inline]
    pub fn handler(&self) -> HandlerId {
        self.handler
    }
}

/// Extension trait for applying a handler's guards to its routes.
pub trait RouterGuardExt {
    /// Runs the guard chain before the handler, which is only invoked when
    /// every guard allows the request.
    ///
    /// Attached as a route layer, so unmatched requests still yield `404`.
    fn guarded<O>(self, state: AuthorizationState<O>) -> Self
    where
        O: OwnershipStore + Clone + 'static;
}

impl<S> RouterGuardExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn guarded<O>(self, state: AuthorizationState<O>) -> Self
    where
        O: OwnershipStore + Clone + 'static,
    {
        self.route_layer(from_fn_with_state(state, authorize::<O>))
    }
}

impl<S> RouterGuardExt for MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn guarded<O>(self, state: AuthorizationState<O>) -> Self
    where
        O: OwnershipStore + Clone + 'static,
    {
        self.route_layer(from_fn_with_state(state, authorize::<O>))
    }
}

/// Evaluates the handler's guard chain and forwards the request on success.
pub async fn authorize<O>(
    State(state): State<AuthorizationState<O>>,
    identity: Option<Identity>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request,
    next: Next,
) -> Result<Response>
where
    O: OwnershipStore + Clone + 'static,
{
    if state.chain.is_empty() {
        return Ok(next.run(request).await);
    }

    let params = params
        .as_ref()
        .map(PathParams::from)
        .unwrap_or_default();

    let outcome = state
        .chain
        .evaluate(identity.as_ref(), &params, &state.store)
        .await;

    if let Err(denial) = outcome.into_result() {
        tracing::debug!(
            target: tracing_targets::AUTHORIZATION,
            handler = %state.handler,
            principal_id = ?identity.as_ref().map(|identity| identity.subject),
            "request denied"
        );
        return Err(Error::from(denial));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Extension;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum_test::TestServer;
    use uuid::Uuid;

    use super::*;
    use crate::guard::mock::MockOwnershipStore;
    use crate::guard::{RequirementTarget, RouteRequirements};

    const BLOCK_STUDENT: HandlerId = HandlerId::new("classrooms", "block_student");
    const PUBLISH: HandlerId = HandlerId::new("content", "publish");
    const HEALTH: HandlerId = HandlerId::new("health", "check");

    const TEACHER: Uuid = Uuid::from_u128(0x7ea);
    const CLASSROOM_42: Uuid = Uuid::from_u128(42);
    const CLASSROOM_99: Uuid = Uuid::from_u128(99);

    fn registry() -> RequirementRegistry {
        let mut registry = RequirementRegistry::new();
        registry
            .attach(
                RouteRequirements::new().with_roles(["teacher", "admin"]),
                RequirementTarget::Controller("classrooms"),
            )
            .attach(
                RouteRequirements::new().with_ownership("classroomId"),
                RequirementTarget::Handler(BLOCK_STUDENT),
            )
            .attach(
                RouteRequirements::new().with_permissions(["content:write"]),
                RequirementTarget::Handler(PUBLISH),
            );
        registry
    }

    /// Stands in for the authentication middleware.
    async fn with_identity(
        Extension(identity): Extension<Option<Identity>>,
        mut request: Request,
        next: Next,
    ) -> Response {
        if let Some(identity) = identity {
            request.extensions_mut().insert(identity);
        }
        next.run(request).await
    }

    struct Harness {
        server: TestServer,
        store: MockOwnershipStore,
        invocations: Arc<AtomicUsize>,
    }

    fn harness(identity: Option<Identity>) -> anyhow::Result<Harness> {
        let registry = registry();
        let store = MockOwnershipStore::new().with_fact(TEACHER, CLASSROOM_42);
        let invocations = Arc::new(AtomicUsize::new(0));

        let counter = invocations.clone();
        let handler = move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::NO_CONTENT
            }
        };

        let app = Router::new()
            .route(
                "/classrooms/{classroomId}/students/{studentId}/block",
                post(handler.clone())
                    .guarded(AuthorizationState::new(&registry, BLOCK_STUDENT, store.clone())),
            )
            .route(
                "/content/{contentId}/publish",
                post(handler.clone())
                    .guarded(AuthorizationState::new(&registry, PUBLISH, store.clone())),
            )
            .route(
                "/health",
                post(handler).guarded(AuthorizationState::new(&registry, HEALTH, store.clone())),
            )
            .layer(axum::middleware::from_fn(with_identity))
            .layer(Extension(identity));

        Ok(Harness {
            server: TestServer::new(app)?,
            store,
            invocations,
        })
    }

    fn block_path(classroom: impl std::fmt::Display) -> String {
        format!("/classrooms/{classroom}/students/{}/block", Uuid::from_u128(7))
    }

    #[tokio::test]
    async fn student_is_forbidden_without_lookup() -> anyhow::Result<()> {
        let student = Identity::new(Uuid::from_u128(0x5d), "student@gamilit.com", "student");
        let harness = harness(Some(student))?;

        let response = harness.server.post(&block_path(CLASSROOM_42)).await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "forbidden");
        assert_eq!(harness.store.calls(), 0);
        assert_eq!(harness.invocations.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn read_only_teacher_cannot_publish() -> anyhow::Result<()> {
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher")
            .with_permissions(["content:read"]);
        let harness = harness(Some(teacher))?;

        let response = harness.server.post("/content/1/publish").await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(harness.invocations.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn teacher_of_another_classroom_is_forbidden() -> anyhow::Result<()> {
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let harness = harness(Some(teacher))?;

        let response = harness.server.post(&block_path(CLASSROOM_99)).await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body = response.json::<serde_json::Value>();
        assert!(!body.to_string().contains(&CLASSROOM_99.to_string()));
        assert_eq!(harness.store.queries(), vec![(TEACHER, CLASSROOM_99)]);
        assert_eq!(harness.invocations.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn owner_reaches_the_handler_once() -> anyhow::Result<()> {
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let harness = harness(Some(teacher))?;

        let response = harness.server.post(&block_path(CLASSROOM_42)).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(harness.store.calls(), 1);
        assert_eq!(harness.invocations.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn anonymous_caller_is_forbidden() -> anyhow::Result<()> {
        let harness = harness(None)?;

        let response = harness.server.post(&block_path(CLASSROOM_42)).await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(harness.store.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn undeclared_route_allows_anonymous_caller() -> anyhow::Result<()> {
        let harness = harness(None)?;

        let response = harness.server.post("/health").await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(harness.invocations.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_resource_id_is_bad_request() -> anyhow::Result<()> {
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");
        let harness = harness(Some(teacher))?;

        let response = harness.server.post(&block_path("classroom-42")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(harness.store.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() -> anyhow::Result<()> {
        let registry = registry();
        let store = MockOwnershipStore::new().failing();
        let teacher = Identity::new(TEACHER, "teacher@gamilit.com", "teacher");

        let app = Router::new()
            .route(
                "/classrooms/{classroomId}/students/{studentId}/block",
                post(|| async { StatusCode::NO_CONTENT }),
            )
            .guarded(AuthorizationState::new(&registry, BLOCK_STUDENT, store))
            .layer(axum::middleware::from_fn(with_identity))
            .layer(Extension(Some(teacher)));
        let server = TestServer::new(app)?;

        let response = server.post(&block_path(CLASSROOM_42)).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "internal_server_error");
        Ok(())
    }
}
