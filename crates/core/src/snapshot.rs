// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data shapes for rollback snapshots (§4.6) and error-reproduction event
//! snapshots (§4.7). Capture/restore logic lives in `bh-engine`/`bh-store`;
//! these are the plain, serializable values they operate on.

use crate::class_name::ClassName;
use crate::event::Event;
use crate::id::SnapshotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Best-effort deep copy of one live instance's non-transient field state,
/// captured before a redefinition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Opaque handle identifying the instance (VM-assigned).
    pub instance_ref: String,
    /// Field name -> serialized value, non-transient fields only.
    pub fields: HashMap<String, String>,
}

/// Metadata about framework registration captured alongside instance state
/// (so a rollback can re-register proxies the way they were before the
/// attempted swap).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameworkMetadata {
    pub adapter_names: Vec<String>,
}

/// Pre-change capture of bytecode and instance state sufficient to restore a
/// class (§3 "Snapshot").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackSnapshot {
    pub snapshot_id: SnapshotId,
    pub class_name: ClassName,
    pub captured_at: DateTime<Utc>,
    pub prior_bytecode: Vec<u8>,
    pub instance_states: Vec<InstanceState>,
    pub framework_metadata: FrameworkMetadata,
    pub prior_snapshot_id: Option<SnapshotId>,
}

impl RollbackSnapshot {
    pub fn new(
        snapshot_id: SnapshotId,
        class_name: ClassName,
        captured_at: DateTime<Utc>,
        prior_bytecode: Vec<u8>,
        instance_states: Vec<InstanceState>,
        framework_metadata: FrameworkMetadata,
        prior_snapshot_id: Option<SnapshotId>,
    ) -> Self {
        Self {
            snapshot_id,
            class_name,
            captured_at,
            prior_bytecode,
            instance_states,
            framework_metadata,
            prior_snapshot_id,
        }
    }
}

/// JVM-like runtime metrics captured alongside an `EventSnapshot` (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub processor_count: u32,
    pub capture_duration_ms: u64,
}

/// A read-only window over a bounded suffix of the event log, captured at
/// the moment an error occurred, for bug reproduction (§4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub snapshot_id: SnapshotId,
    pub captured_at: DateTime<Utc>,
    pub captured_events: Vec<Event>,
    pub thread_name: String,
    pub environment: HashMap<String, String>,
    pub system_properties: HashMap<String, String>,
    pub causal_chain: Option<Vec<crate::id::EventId>>,
    pub performance_metrics: PerformanceMetrics,
    /// Set when the real capture could not reach the event store and a
    /// minimal fallback was produced instead (§4.7 "degrading gracefully").
    pub is_fallback: bool,
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
