//! In-memory store of finished refinement sessions.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::geo::{Coordinate, Profile};
use crate::observability::metrics;
use crate::refinement::RefinementResult;

/// A finished session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    /// Unix timestamp (seconds) when the session finished.
    pub finished_at: u64,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub profile: Profile,
    pub result: RefinementResult,
}

struct Entry {
    /// Insertion order; eviction removes the smallest.
    seq: u64,
    record: SessionRecord,
}

/// Thread-safe session store. Nothing is persisted across restarts.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, Entry>>,
    next_seq: Arc<AtomicU64>,
    capacity: usize,
}

impl SessionStore {
    /// `capacity == 0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    /// Store a finished session and return its record, evicting the
    /// earliest-stored sessions beyond capacity.
    pub fn insert(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: Profile,
        result: RefinementResult,
    ) -> SessionRecord {
        let record = SessionRecord {
            id: Uuid::new_v4(),
            finished_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            origin,
            destination,
            profile,
            result,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.insert(
            record.id,
            Entry {
                seq,
                record: record.clone(),
            },
        );
        while self.capacity > 0 && self.inner.len() > self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }
        metrics::record_stored_sessions(self.inner.len());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionRecord> {
        self.inner.get(id).map(|e| e.record.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .inner
            .iter()
            .min_by_key(|e| e.value().seq)
            .map(|e| *e.key());
        match oldest {
            Some(id) => {
                self.inner.remove(&id);
                tracing::debug!(session = %id, "Evicted oldest refinement session");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Route;
    use crate::refinement::{RefinementOutcome, RefinementStatus};

    fn result() -> RefinementResult {
        RefinementResult {
            status: RefinementStatus::Succeeded,
            outcome: RefinementOutcome::Cleared,
            final_route: Route::from_coordinates(vec![Coordinate::new(1.0, 1.0)]),
            final_obstacles: Vec::new(),
            final_zones: Vec::new(),
            attempts_used: 1,
            initial_obstacle_count: 1,
            accumulated_zones: Vec::new(),
            abort_reason: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = SessionStore::new(0);
        let a = Coordinate::new(1.0, 1.0);
        let record = store.insert(a, a, Profile::Foot, result());

        let fetched = store.get(&record.id).expect("session stored");
        assert_eq!(fetched.result, record.result);
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_capacity_is_enforced() {
        let store = SessionStore::new(2);
        let a = Coordinate::new(1.0, 1.0);
        for _ in 0..5 {
            store.insert(a, a, Profile::Foot, result());
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_eviction_follows_insertion_order() {
        let store = SessionStore::new(2);
        let a = Coordinate::new(1.0, 1.0);
        let first = store.insert(a, a, Profile::Foot, result());
        let second = store.insert(a, a, Profile::Foot, result());
        let third = store.insert(a, a, Profile::Foot, result());

        // All three finish within the same second.
        assert!(store.get(&first.id).is_none());
        assert!(store.get(&second.id).is_some());
        assert!(store.get(&third.id).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_respect_capacity() {
        let store = SessionStore::new(5);
        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let a = Coordinate::new(1.0, 1.0);
                    store.insert(a, a, Profile::Foot, result())
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(store.len() <= 5, "store grew to {}", store.len());
        assert!(!store.is_empty());
    }
}
