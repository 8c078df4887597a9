// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event store contract (§4.1): durable, append-only, per-aggregate.

use bh_core::Event;
use thiserror::Error;

/// Errors the store can report. `VersionConflict` is never retried by the
/// store itself; the caller decides (§7: coordinator retries exactly once
/// after refreshing the aggregate's current version).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("version conflict on {aggregate_id}: expected {expected}, got {actual}")]
    VersionConflict {
        aggregate_id: String,
        expected: u64,
        actual: u64,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable, append-only, per-aggregate event log with time-range and
/// type-range queries (§4.1 operations).
pub trait EventStore: Send + Sync {
    /// Append `event`. Fails with `VersionConflict` if
    /// `aggregate_version != current_version(aggregate) + 1`. Durable before
    /// returning; subsequent reads include it.
    fn save(&self, event: Event) -> StoreResult<Event>;

    /// Events of one aggregate, ordered by `aggregate_version`.
    fn events_for(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<Vec<Event>>;

    /// Events of one aggregate with `aggregate_version > since_version`,
    /// ordered by `aggregate_version`.
    fn events_for_since(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        since_version: u64,
    ) -> StoreResult<Vec<Event>>;

    /// All events of a given type, ordered by `timestamp`.
    fn events_by_type(&self, event_type: &str) -> StoreResult<Vec<Event>>;

    /// All events in `[t_start, t_end]` inclusive, ordered by `timestamp`.
    fn events_between(
        &self,
        t_start: chrono::DateTime<chrono::Utc>,
        t_end: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<Vec<Event>>;

    /// Highest `aggregate_version` written for this aggregate, or 0 if absent.
    fn current_version(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<u64>;

    fn aggregate_exists(&self, aggregate_type: &str, aggregate_id: &str) -> StoreResult<bool>;

    fn aggregate_types(&self) -> StoreResult<Vec<String>>;

    fn aggregate_ids(&self, aggregate_type: &str) -> StoreResult<Vec<String>>;

    /// `Healthy ↔ Unhealthy` probe; always succeeds even when the store is
    /// otherwise refusing operations (§4.1 state machine).
    fn is_healthy(&self) -> bool;

    fn total_event_count(&self) -> StoreResult<u64>;
}

#[cfg(test)]
#[path = "event_store_tests.rs"]
mod tests;
