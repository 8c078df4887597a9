// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the hot-swap pipeline.
//!
//! Every event is a small common header (`EventHeader`) plus a per-variant
//! payload (`EventPayload`), per the "tagged union, no object back-pointers"
//! re-architecture note: response events reference their predecessor by
//! `event_id`, resolved later through the store, never by an in-memory link.

use crate::aggregate::AggregateType;
use crate::bytecode::{ClassMetadata, FieldDescriptor, MethodDescriptor, RejectedChange};
use crate::class_name::ClassName;
use crate::id::{CorrelationId, EventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bumped whenever a payload variant's shape changes.
pub const SCHEMA_VERSION: u16 = 1;

/// Common metadata every event carries (§3 "Event (abstract)").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    pub event_id: EventId,
    pub aggregate_type: AggregateType,
    pub aggregate_version: u64,
    pub timestamp: DateTime<Utc>,
    pub previous_event_id: Option<EventId>,
    pub schema_version: u16,
    pub correlation_id: CorrelationId,
    pub causation_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Assigned atomically by the store at append time; `None` before a
    /// round-trip through the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_position: Option<u64>,
}

impl EventHeader {
    pub fn aggregate_id(&self) -> String {
        self.aggregate_type.aggregate_id()
    }
}

/// A strategy the instance reconciler used to bring instances up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStrategy {
    /// Only transient/derived state was reset; fields are unchanged.
    CacheInvalidation,
    /// Framework-managed instances were refreshed via `FrameworkAdapter`.
    FrameworkRefresh,
    /// Both cache invalidation and framework refresh ran.
    Full,
}

/// Per-instance error recorded when reconciliation is only partially
/// successful (§4.5 failure semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceReconciliationError {
    pub instance_ref: String,
    pub message: String,
}

/// One entry of a `RollbackAuditTrail` (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackAuditEntry {
    pub snapshot_id: crate::id::SnapshotId,
    pub class_name: ClassName,
    pub correlation_id: CorrelationId,
    pub causation_id: Option<EventId>,
    pub outcome: RollbackOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackOutcome {
    Restored,
    Skipped { reason: String },
    Aborted { reason: String },
}

/// The per-variant event payload. Serializes as `{"type": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    #[serde(rename = "class_file_changed")]
    ClassFileChanged {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },

    #[serde(rename = "class_file_created")]
    ClassFileCreated {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },

    #[serde(rename = "class_file_deleted")]
    ClassFileDeleted {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },

    #[serde(rename = "class_metadata_extracted")]
    ClassMetadataExtracted {
        class_file: PathBuf,
        class_name: ClassName,
        super_class: Option<String>,
        interfaces: Vec<String>,
        fields: Vec<FieldDescriptor>,
        methods: Vec<MethodDescriptor>,
    },

    #[serde(rename = "bytecode_validated")]
    BytecodeValidated {
        class_file: PathBuf,
        class_name: ClassName,
        metadata: ClassMetadata,
    },

    #[serde(rename = "bytecode_rejected")]
    BytecodeRejected {
        class_file: PathBuf,
        class_name: ClassName,
        reason: String,
        rejected_changes: Vec<RejectedChange>,
        recovery_action: String,
    },

    #[serde(rename = "hot_swap_requested")]
    HotSwapRequested {
        class_file: PathBuf,
        class_name: ClassName,
        original_bytecode: Vec<u8>,
        new_bytecode: Vec<u8>,
        reason: String,
        preceding_event_id: EventId,
    },

    #[serde(rename = "class_redefinition_succeeded")]
    ClassRedefinitionSucceeded {
        class_name: ClassName,
        class_file: PathBuf,
        affected_instances: u64,
        details: String,
        duration_ms: u64,
        preceding_event_id: EventId,
    },

    #[serde(rename = "class_redefinition_failed")]
    ClassRedefinitionFailed {
        class_name: ClassName,
        class_file: PathBuf,
        reason: String,
        vm_error: String,
        recovery_action: String,
        preceding_event_id: EventId,
    },

    #[serde(rename = "instances_updated")]
    InstancesUpdated {
        class_name: ClassName,
        updated_instance_count: u64,
        strategy: ReconciliationStrategy,
        partial: bool,
        errors: Vec<InstanceReconciliationError>,
        preceding_event_id: EventId,
    },

    #[serde(rename = "rollback_snapshot_captured")]
    RollbackSnapshotCaptured {
        snapshot_id: crate::id::SnapshotId,
        class_name: ClassName,
        prior_snapshot_id: Option<crate::id::SnapshotId>,
    },

    #[serde(rename = "rollback_requested")]
    RollbackRequested {
        snapshot_id: crate::id::SnapshotId,
        class_name: ClassName,
        cascade: bool,
    },

    #[serde(rename = "rollback_completed")]
    RollbackCompleted {
        snapshot_id: crate::id::SnapshotId,
        class_name: ClassName,
        entries: Vec<RollbackAuditEntry>,
        preceding_event_id: EventId,
    },

    #[serde(rename = "rollback_failed")]
    RollbackFailed {
        snapshot_id: crate::id::SnapshotId,
        class_name: ClassName,
        reason: String,
        preceding_event_id: EventId,
    },

    #[serde(rename = "flow_discovered")]
    FlowDiscovered {
        flow_id: crate::id::FlowId,
        flow_name: String,
        triggering_events: Vec<EventId>,
        confidence: f64,
        discovered_at: DateTime<Utc>,
    },

    #[serde(rename = "watch_queue_overflow")]
    WatchQueueOverflow {
        class_file: PathBuf,
        dropped_event_summary: String,
    },

    #[serde(rename = "file_watch_stopped")]
    FileWatchStopped { path: PathBuf, reason: String },

    /// Preserves forward compatibility: unknown type tags deserialize here
    /// instead of failing, so a newer writer never corrupts an older reader.
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    /// Event-type name as used by `events_by_type` and flow matching (§4.8
    /// matches built-in patterns "by event-type name only").
    pub fn type_name(&self) -> &'static str {
        match self {
            EventPayload::ClassFileChanged { .. } => "class_file_changed",
            EventPayload::ClassFileCreated { .. } => "class_file_created",
            EventPayload::ClassFileDeleted { .. } => "class_file_deleted",
            EventPayload::ClassMetadataExtracted { .. } => "class_metadata_extracted",
            EventPayload::BytecodeValidated { .. } => "bytecode_validated",
            EventPayload::BytecodeRejected { .. } => "bytecode_rejected",
            EventPayload::HotSwapRequested { .. } => "hot_swap_requested",
            EventPayload::ClassRedefinitionSucceeded { .. } => "class_redefinition_succeeded",
            EventPayload::ClassRedefinitionFailed { .. } => "class_redefinition_failed",
            EventPayload::InstancesUpdated { .. } => "instances_updated",
            EventPayload::RollbackSnapshotCaptured { .. } => "rollback_snapshot_captured",
            EventPayload::RollbackRequested { .. } => "rollback_requested",
            EventPayload::RollbackCompleted { .. } => "rollback_completed",
            EventPayload::RollbackFailed { .. } => "rollback_failed",
            EventPayload::FlowDiscovered { .. } => "flow_discovered",
            EventPayload::WatchQueueOverflow { .. } => "watch_queue_overflow",
            EventPayload::FileWatchStopped { .. } => "file_watch_stopped",
            EventPayload::Unknown => "unknown",
        }
    }

    /// The preceding event this one responds to, for I5/P2: "a response-type
    /// event exposes its preceding event". `None` for events that start a
    /// chain rather than respond to one.
    pub fn preceding_event_id(&self) -> Option<&EventId> {
        match self {
            EventPayload::HotSwapRequested {
                preceding_event_id, ..
            }
            | EventPayload::ClassRedefinitionSucceeded {
                preceding_event_id, ..
            }
            | EventPayload::ClassRedefinitionFailed {
                preceding_event_id, ..
            }
            | EventPayload::InstancesUpdated {
                preceding_event_id, ..
            }
            | EventPayload::RollbackCompleted {
                preceding_event_id, ..
            }
            | EventPayload::RollbackFailed {
                preceding_event_id, ..
            } => Some(preceding_event_id),
            _ => None,
        }
    }
}

/// A fully-formed, immutable event: header plus payload.
///
/// Deliberately *not* flattened into one JSON object: combining `#[serde(flatten)]`
/// with an internally-tagged payload enum is fragile across formats, and the
/// persisted-record layout (§6) already separates header fields from the
/// type-tagged payload, so the in-memory shape mirrors it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub header: EventHeader,
    pub payload: EventPayload,
}

impl Event {
    pub fn event_id(&self) -> &EventId {
        &self.header.event_id
    }

    pub fn aggregate_version(&self) -> u64 {
        self.header.aggregate_version
    }

    pub fn type_name(&self) -> &'static str {
        self.payload.type_name()
    }
}

/// Builds events with header fields derived from the aggregate's current
/// tip, enforcing I1 (version monotonicity) and I5 (response linkage) at
/// construction time instead of leaving callers to assemble headers by hand.
pub struct EventFactory<'a> {
    clock: &'a dyn crate::clock::Clock,
    id_gen: &'a dyn crate::id::IdGen,
}

impl<'a> EventFactory<'a> {
    pub fn new(clock: &'a dyn crate::clock::Clock, id_gen: &'a dyn crate::id::IdGen) -> Self {
        Self { clock, id_gen }
    }

    /// Build the next event for `aggregate_type`, chaining off `previous`
    /// (the last known event of the same aggregate, or `None` if this is the
    /// aggregate's first event).
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        &self,
        aggregate_type: AggregateType,
        previous: Option<&Event>,
        correlation_id: CorrelationId,
        causation_id: Option<EventId>,
        user_id: Option<String>,
        payload: EventPayload,
    ) -> Event {
        let aggregate_version = previous.map(|e| e.aggregate_version() + 1).unwrap_or(1);
        let previous_event_id = previous.map(|e| e.event_id().clone());
        Event {
            header: EventHeader {
                event_id: EventId::new(self.id_gen.next()),
                aggregate_type,
                aggregate_version,
                timestamp: self.clock.now(),
                previous_event_id,
                schema_version: SCHEMA_VERSION,
                correlation_id,
                causation_id,
                user_id,
                stream_position: None,
            },
            payload,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
