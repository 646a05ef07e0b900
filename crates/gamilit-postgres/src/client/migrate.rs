//! Embedded schema migrations.

use std::time::Instant;

use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION};

type BlockingConnection = AsyncConnectionWrapper<PooledConnection>;

/// Applied and pending migration versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied versions, oldest first.
    pub applied_versions: Vec<String>,
    /// Embedded versions not yet applied, oldest first.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    pub fn new(
        applied_versions: impl Into<Vec<String>>,
        pending_versions: impl Into<Vec<String>>,
    ) -> Self {
        Self {
            applied_versions: applied_versions.into(),
            pending_versions: pending_versions.into(),
        }
    }

    #[inline]
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    #[inline]
    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Migration management for [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending embedded migration and returns their versions.
    ///
    /// Safe to call on every start-up.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>> + Send;

    /// Compares the embedded migrations against the database.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<Vec<String>> {
        let start = Instant::now();
        let conn = self.get_pooled_connection().await?;

        let versions = with_blocking_connection(conn, |conn| {
            let applied = conn.run_pending_migrations(MIGRATIONS)?;
            Ok(applied.into_iter().map(|v| v.to_string()).collect::<Vec<_>>())
        })
        .await
        .inspect_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                elapsed = ?start.elapsed(),
                "database migration failed"
            );
        })?;

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = versions.len(),
            elapsed = ?start.elapsed(),
            "database schema is up to date"
        );

        Ok(versions)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        let conn = self.get_pooled_connection().await?;

        let status = with_blocking_connection(conn, |conn| {
            let applied = conn
                .applied_migrations()?
                .into_iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>();

            let pending = MigrationSource::<Pg>::migrations(&MIGRATIONS)?
                .into_iter()
                .map(|m| m.name().version().to_string())
                .filter(|version| !applied.contains(version))
                .collect::<Vec<_>>();

            Ok(MigrationStatus::new(applied, pending))
        })
        .await?;

        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_versions.len(),
            pending = status.pending_versions.len(),
            "migration status retrieved"
        );

        Ok(status)
    }
}

/// Runs a synchronous migration harness call off the async runtime.
async fn with_blocking_connection<T, F>(conn: PooledConnection, f: F) -> PgResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut BlockingConnection) -> diesel::migration::Result<T> + Send + 'static,
{
    let mut conn: BlockingConnection = conn.into();
    spawn_blocking(move || f(&mut conn))
        .await
        .map_err(|err| PgError::Migration(err.into()))?
        .map_err(PgError::Migration)
}
