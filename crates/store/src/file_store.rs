// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable `EventStore` adapter: an in-memory index backed by a WAL on disk,
//! so the engine survives process restarts (§6 "Persisted event record").
//! Compaction is out of scope (§6); the WAL only ever grows, modulo the
//! retention pruning in `retention`.

use crate::event_store::{EventStore, StoreError, StoreResult};
use crate::wal::{Wal, WalError};
use bh_core::Event;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::memory_store::InMemoryEventStore;

pub struct FileEventStore {
    memory: InMemoryEventStore,
    wal: Mutex<Wal>,
}

impl FileEventStore {
    /// Open or create the store at `path`, replaying any events already on
    /// disk before accepting new writes.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let replayed = Wal::replay(path)?;
        let memory = InMemoryEventStore::new();
        for event in replayed {
            // Events on disk were already validated when first written; a
            // version conflict here would mean the WAL itself is corrupt in
            // a way replay's line-level check didn't catch.
            memory
                .save(event)
                .expect("replayed WAL events must be sequential per aggregate");
        }
        let wal = Wal::open(path)?;
        Ok(Self {
            memory,
            wal: Mutex::new(wal),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.wal.lock().path().to_path_buf()
    }
}

impl EventStore for FileEventStore {
    fn save(&self, event: Event) -> StoreResult<Event> {
        let saved = self.memory.save(event)?;
        let position = saved
            .header
            .stream_position
            .expect("memory store always assigns stream_position on save");
        self.wal
            .lock()
            .append(position, &saved)
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Ok(saved)
    }

    fn events_for(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<Vec<Event>> {
        self.memory.events_for(aggregate_type, aggregate_id)
    }

    fn events_for_since(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        since_version: u64,
    ) -> StoreResult<Vec<Event>> {
        self.memory
            .events_for_since(aggregate_type, aggregate_id, since_version)
    }

    fn events_by_type(&self, event_type: &str) -> StoreResult<Vec<Event>> {
        self.memory.events_by_type(event_type)
    }

    fn events_between(&self, t_start: DateTime<Utc>, t_end: DateTime<Utc>) -> StoreResult<Vec<Event>> {
        self.memory.events_between(t_start, t_end)
    }

    fn current_version(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<u64> {
        self.memory.current_version(aggregate_type, aggregate_id)
    }

    fn aggregate_exists(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<bool> {
        self.memory.aggregate_exists(aggregate_type, aggregate_id)
    }

    fn aggregate_types(&self) -> StoreResult<Vec<String>> {
        self.memory.aggregate_types()
    }

    fn aggregate_ids(&self, aggregate_type: &str) -> StoreResult<Vec<String>> {
        self.memory.aggregate_ids(aggregate_type)
    }

    fn is_healthy(&self) -> bool {
        self.memory.is_healthy()
    }

    fn total_event_count(&self) -> StoreResult<u64> {
        self.memory.total_event_count()
    }
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod tests;
