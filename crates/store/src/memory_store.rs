// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference `EventStore` adapter (§6: "pluggable; the reference
//! in-memory adapter is specified in §8 for tests").

use crate::event_store::{EventStore, StoreError, StoreResult};
use bh_core::Event;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

struct Inner {
    /// All events in global append order; index is `stream_position`.
    global: Vec<Event>,
    /// `(aggregate_type, aggregate_id) -> aggregate_version-ordered events`.
    by_aggregate: HashMap<(String, String), Vec<Event>>,
    healthy: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            global: Vec::new(),
            by_aggregate: HashMap::new(),
            healthy: true,
        }
    }
}

/// Single-process, all-in-memory event store. Writes are serialized by the
/// single `RwLock` write lock (§5: "writes are serialized per aggregate" is
/// satisfied trivially since there is one writer at a time across all
/// aggregates here); reads take only a read lock, so concurrent readers
/// never block each other or a reader mid-write never observes a partial
/// event — the write lock makes each append atomic from readers' view.
pub struct InMemoryEventStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::new()),
        }
    }

    /// Flip the health flag for tests exercising the `Healthy ↔ Unhealthy`
    /// state machine (§4.1).
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_healthy(&self, healthy: bool) {
        self.inner.write().healthy = healthy;
    }
}

fn key(aggregate_type: &str, aggregate_id: &str) -> (String, String) {
    (aggregate_type.to_string(), aggregate_id.to_string())
}

impl EventStore for InMemoryEventStore {
    fn save(&self, mut event: Event) -> StoreResult<Event> {
        let mut inner = self.inner.write();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }

        let aggregate_type = event.header.aggregate_type.type_name().to_string();
        let aggregate_id = event.header.aggregate_id();
        let k = key(&aggregate_type, &aggregate_id);
        let current = inner
            .by_aggregate
            .get(&k)
            .and_then(|events| events.last())
            .map(|e| e.aggregate_version())
            .unwrap_or(0);

        if event.aggregate_version() != current + 1 {
            return Err(StoreError::VersionConflict {
                aggregate_id,
                expected: current + 1,
                actual: event.aggregate_version(),
            });
        }

        let stream_position = inner.global.len() as u64;
        event.header.stream_position = Some(stream_position);

        inner.by_aggregate.entry(k).or_default().push(event.clone());
        inner.global.push(event.clone());

        Ok(event)
    }

    fn events_for(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }
        Ok(inner
            .by_aggregate
            .get(&key(aggregate_type, aggregate_id))
            .cloned()
            .unwrap_or_default())
    }

    fn events_for_since(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        since_version: u64,
    ) -> StoreResult<Vec<Event>> {
        Ok(self
            .events_for(aggregate_type, aggregate_id)?
            .into_iter()
            .filter(|e| e.aggregate_version() > since_version)
            .collect())
    }

    fn events_by_type(&self, event_type: &str) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }
        let mut events: Vec<Event> = inner
            .global
            .iter()
            .filter(|e| e.type_name() == event_type)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.header.timestamp);
        Ok(events)
    }

    fn events_between(
        &self,
        t_start: DateTime<Utc>,
        t_end: DateTime<Utc>,
    ) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }
        let mut events: Vec<Event> = inner
            .global
            .iter()
            .filter(|e| e.header.timestamp >= t_start && e.header.timestamp <= t_end)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.header.timestamp);
        Ok(events)
    }

    fn current_version(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<u64> {
        let inner = self.inner.read();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }
        Ok(inner
            .by_aggregate
            .get(&key(aggregate_type, aggregate_id))
            .and_then(|events| events.last())
            .map(|e| e.aggregate_version())
            .unwrap_or(0))
    }

    fn aggregate_exists(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<bool> {
        Ok(self.current_version(aggregate_type, aggregate_id)? > 0)
    }

    fn aggregate_types(&self) -> StoreResult<Vec<String>> {
        let inner = self.inner.read();
        let mut types: Vec<String> = inner
            .by_aggregate
            .keys()
            .map(|(t, _)| t.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        types.sort();
        Ok(types)
    }

    fn aggregate_ids(&self, aggregate_type: &str) -> StoreResult<Vec<String>> {
        let inner = self.inner.read();
        let mut ids: Vec<String> = inner
            .by_aggregate
            .keys()
            .filter(|(t, _)| t == aggregate_type)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn is_healthy(&self) -> bool {
        self.inner.read().healthy
    }

    fn total_event_count(&self) -> StoreResult<u64> {
        let inner = self.inner.read();
        if !inner.healthy {
            return Err(StoreError::StoreUnavailable(
                "store is marked unhealthy".into(),
            ));
        }
        Ok(inner.global.len() as u64)
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
