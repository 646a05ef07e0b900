//! Application state and dependency injection.

use gamilit_postgres::PgClient;

use crate::guard::{HandlerId, RequirementRegistry, SharedRegistry};
use crate::middleware::AuthorizationState;
use crate::service::{AuthKeys, Result, ServiceConfig};
use crate::utility::tracing_targets;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    auth_keys: AuthKeys,
    requirements: SharedRegistry,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// `requirements` must already hold every route declaration; it is frozen
    /// here and read-only afterwards.
    pub async fn from_config(
        config: &ServiceConfig,
        requirements: RequirementRegistry,
    ) -> Result<Self> {
        let service_state = Self {
            pg_client: config.connect_postgres().await?,
            auth_keys: config.load_auth_keys()?,
            requirements: requirements.into_shared(),
        };

        tracing::info!(
            target: tracing_targets::SERVICE,
            postgres = %config.postgres.database_url_masked(),
            "service state initialized"
        );

        Ok(service_state)
    }

    /// Guard state for `handler`, backed by the Postgres ownership store.
    pub fn authorization(&self, handler: HandlerId) -> AuthorizationState<PgClient> {
        AuthorizationState::new(&self.requirements, handler, self.pg_client.clone())
    }

    #[inline]
    pub fn auth_keys(&self) -> AuthKeys {
        self.auth_keys.clone()
    }

    #[inline]
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }

    #[inline]
    pub fn requirements(&self) -> &RequirementRegistry {
        &self.requirements
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(auth_keys: AuthKeys);
impl_di!(requirements: SharedRegistry);
