//! In-memory ownership store for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gamilit_postgres::{PgError, PgResult};
use uuid::Uuid;

use super::OwnershipStore;

/// Records every lookup so tests can assert on the number and arguments of
/// store queries.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockOwnershipStore {
    inner: Arc<MockInner>,
}

#[derive(Debug, Default)]
struct MockInner {
    facts: Mutex<HashSet<(Uuid, Uuid)>>,
    queries: Mutex<Vec<(Uuid, Uuid)>>,
    failing: AtomicBool,
}

impl MockOwnershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fact(self, principal: Uuid, resource: Uuid) -> Self {
        self.inner
            .facts
            .lock()
            .unwrap()
            .insert((principal, resource));
        self
    }

    pub fn failing(self) -> Self {
        self.inner.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn revoke(&self, principal: Uuid, resource: Uuid) {
        self.inner
            .facts
            .lock()
            .unwrap()
            .remove(&(principal, resource));
    }

    pub fn queries(&self) -> Vec<(Uuid, Uuid)> {
        self.inner.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.queries.lock().unwrap().len()
    }
}

impl OwnershipStore for MockOwnershipStore {
    async fn is_active_owner(&self, principal: Uuid, resource: Uuid) -> PgResult<bool> {
        self.inner
            .queries
            .lock()
            .unwrap()
            .push((principal, resource));

        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(PgError::Unexpected("ownership store unavailable".into()));
        }

        let facts = self.inner.facts.lock().unwrap();
        Ok(facts.contains(&(principal, resource)))
    }
}
