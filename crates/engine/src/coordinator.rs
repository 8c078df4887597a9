// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hot-swap coordinator (§4.4): drives the validated-to-installed transition
//! for exactly one class, classifies VM failures, and hands off to the
//! reconciler on success.

use crate::error::RedefinitionError;
use crate::reconciler;
use bh_adapters::{FrameworkAdapter, InstanceRegistry, VmErrorCategory, VmInstrumentation};
use bh_core::{
    ClassName, Clock, CorrelationId, Event, EventFactory, EventId, EventPayload, IdGen,
    InstanceState, RollbackSnapshot, SnapshotId,
};
use bh_store::{EventStore, StoreError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Redefinition/reconciliation deadlines (§4.4 "Timeout", §6 `swap.*_timeout_ms`).
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub redefinition: Duration,
    pub reconciliation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            redefinition: Duration::from_millis(5_000),
            reconciliation: Duration::from_millis(10_000),
        }
    }
}

/// Append `event` to `store`, retrying exactly once after refreshing the
/// aggregate's current version on a `VersionConflict` (§7 propagation
/// policy: "a single retry after refreshing... a second conflict surfaces").
pub(crate) fn save_with_retry(store: &dyn EventStore, mut event: Event) -> Result<Event, StoreError> {
    match store.save(event.clone()) {
        Ok(saved) => Ok(saved),
        Err(StoreError::VersionConflict { .. }) => {
            let aggregate_type = event.header.aggregate_type.type_name();
            let aggregate_id = event.header.aggregate_id();
            let current = store.current_version(aggregate_type, &aggregate_id)?;
            event.header.aggregate_version = current + 1;
            store.save(event)
        }
        Err(other) => Err(other),
    }
}

/// I3 check: the latest event on `hotswap:<fqn>` must not be an unresolved
/// `HotSwapRequested`.
fn has_unresolved_request(store: &dyn EventStore, class_name: &ClassName) -> Result<bool, StoreError> {
    let events = store.events_for("hotswap", class_name.as_str())?;
    Ok(matches!(
        events.last().map(|e| &e.payload),
        Some(EventPayload::HotSwapRequested { .. })
    ))
}

/// `request_hotswap` (§4.4): records the intent to swap a class's bytecode.
/// Fails with `ClassNotLoaded`-shaped... no — this step never talks to the
/// VM; its only precondition is I3.
#[allow(clippy::too_many_arguments)]
pub fn request_hotswap(
    store: &dyn EventStore,
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    class_file: PathBuf,
    class_name: &ClassName,
    original_bytecode: Vec<u8>,
    new_bytecode: Vec<u8>,
    reason: impl Into<String>,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> Result<Event, RedefinitionError> {
    if has_unresolved_request(store, class_name).map_err(|e| RedefinitionError::EngineError(e.to_string()))? {
        return Err(RedefinitionError::EngineError(format!(
            "{class_name} already has an unresolved hot-swap request"
        )));
    }

    let previous = store
        .events_for("hotswap", class_name.as_str())
        .map_err(|e| RedefinitionError::EngineError(e.to_string()))?;
    let previous = previous.last().cloned();

    let factory = EventFactory::new(clock, id_gen);
    let payload = EventPayload::HotSwapRequested {
        class_file,
        class_name: class_name.clone(),
        original_bytecode,
        new_bytecode,
        reason: reason.into(),
        preceding_event_id: causation_id.clone().unwrap_or_else(|| EventId::new(id_gen.next())),
    };
    let event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        previous.as_ref(),
        correlation_id,
        causation_id,
        None,
        payload,
    );

    save_with_retry(store, event).map_err(|e| RedefinitionError::EngineError(e.to_string()))
}

/// Capture a `RollbackSnapshot` from the VM's current bytecode and live
/// instances before attempting a redefinition (§4.6 "Create").
pub async fn capture_snapshot(
    vm: &dyn VmInstrumentation,
    registry: &dyn InstanceRegistry,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    class_name: &ClassName,
    current_bytecode: Vec<u8>,
    prior_snapshot_id: Option<SnapshotId>,
) -> RollbackSnapshot {
    let instances = registry.instances_of(class_name.as_str()).await;
    let instance_states = instances
        .into_iter()
        .map(|handle| InstanceState {
            instance_ref: handle.0,
            fields: Default::default(),
        })
        .collect();
    let _ = vm.all_loaded_classes().await;

    RollbackSnapshot::new(
        SnapshotId::new(id_gen.next()),
        class_name.clone(),
        clock.now(),
        current_bytecode,
        instance_states,
        Default::default(),
        prior_snapshot_id,
    )
}

/// Outcome of `perform_redefinition`: the terminal event (success or
/// failure) plus the snapshot captured ahead of the VM call.
pub struct RedefinitionOutcome {
    pub event: Event,
    pub snapshot: RollbackSnapshot,
}

/// `perform_redefinition` (§4.4 steps 1-6): resolve the loaded class, snapshot
/// it (recorded as `RollbackSnapshotCaptured` ahead of the VM call), invoke
/// the VM, classify the outcome, reconcile instances on success, and append
/// the terminal event followed by `InstancesUpdated`.
#[allow(clippy::too_many_arguments)]
pub async fn perform_redefinition(
    store: &dyn EventStore,
    vm: &dyn VmInstrumentation,
    registry: &dyn InstanceRegistry,
    adapters: &[Box<dyn FrameworkAdapter>],
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    timeouts: Timeouts,
    request: &Event,
) -> Result<RedefinitionOutcome, RedefinitionError> {
    let EventPayload::HotSwapRequested {
        class_file,
        class_name,
        original_bytecode,
        new_bytecode,
        ..
    } = &request.payload
    else {
        return Err(RedefinitionError::EngineError(
            "perform_redefinition called with a non-HotSwapRequested event".into(),
        ));
    };

    let started = std::time::Instant::now();
    let correlation_id = request.header.correlation_id.clone();
    let causation_id = Some(request.event_id().clone());

    let handle = match vm.find_loaded_class(class_name.as_str()).await {
        Some(handle) => handle,
        None => {
            let event = failure_event(
                store,
                clock,
                id_gen,
                class_name,
                class_file.clone(),
                "Class not found".to_string(),
                "ClassNotFoundException".to_string(),
                "Load or instantiate the class first".to_string(),
                correlation_id,
                causation_id,
            )?;
            return Ok(RedefinitionOutcome {
                event,
                snapshot: empty_snapshot(id_gen, clock, class_name),
            });
        }
    };

    let snapshot = capture_snapshot(vm, registry, id_gen, clock, class_name, original_bytecode.clone(), None).await;
    record_snapshot(store, clock, id_gen, class_name, &snapshot, correlation_id.clone(), causation_id.clone())?;

    let redefinition = tokio::time::timeout(timeouts.redefinition, vm.redefine_class(&handle, new_bytecode)).await;

    let redefinition = match redefinition {
        Ok(inner) => inner,
        Err(_) => {
            let event = failure_event(
                store,
                clock,
                id_gen,
                class_name,
                class_file.clone(),
                "Redefinition timed out".to_string(),
                "deadline exceeded".to_string(),
                "Inspect logs; retry".to_string(),
                correlation_id,
                causation_id,
            )?;
            return Ok(RedefinitionOutcome { event, snapshot });
        }
    };

    if let Err(vm_error) = redefinition {
        let (reason, recovery_action) = match vm_error.category {
            VmErrorCategory::SchemaChange => (
                "JVM rejected schema changes".to_string(),
                "Restart application to load new class definition".to_string(),
            ),
            VmErrorCategory::UnsupportedChange => (
                "VM rejected an unsupported change".to_string(),
                "Use a compatible change or restart".to_string(),
            ),
            VmErrorCategory::ClassNotLoaded => (
                "Class not found".to_string(),
                "Load or instantiate the class first".to_string(),
            ),
            VmErrorCategory::Other => ("VM rejected the redefinition".to_string(), "Check compatibility; retry".to_string()),
        };
        warn!(class = %class_name, error = %vm_error, "redefinition rejected by VM");
        let event = failure_event(
            store,
            clock,
            id_gen,
            class_name,
            class_file.clone(),
            reason,
            vm_error.message,
            recovery_action,
            correlation_id,
            causation_id,
        )?;
        return Ok(RedefinitionOutcome { event, snapshot });
    }

    let reconciliation = tokio::time::timeout(timeouts.reconciliation, reconciler::reconcile(class_name, registry, adapters)).await;

    let outcome = match reconciliation {
        Ok(outcome) => outcome,
        Err(_) => {
            let event = failure_event(
                store,
                clock,
                id_gen,
                class_name,
                class_file.clone(),
                "Reconciliation timed out".to_string(),
                "deadline exceeded".to_string(),
                "Inspect logs; retry".to_string(),
                correlation_id,
                causation_id,
            )?;
            return Ok(RedefinitionOutcome { event, snapshot });
        }
    };

    info!(class = %class_name, instances = outcome.updated_instance_count, "redefinition succeeded");

    let previous = store
        .events_for("hotswap", class_name.as_str())
        .map_err(|e| RedefinitionError::EngineError(e.to_string()))?;
    let previous = previous.last().cloned();
    let factory = EventFactory::new(clock, id_gen);
    let payload = EventPayload::ClassRedefinitionSucceeded {
        class_name: class_name.clone(),
        class_file: class_file.clone(),
        affected_instances: outcome.updated_instance_count,
        details: format!("redefinition of {class_name} completed"),
        duration_ms: started.elapsed().as_millis() as u64,
        preceding_event_id: request.event_id().clone(),
    };
    let event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        previous.as_ref(),
        correlation_id.clone(),
        causation_id.clone(),
        None,
        payload,
    );
    let event = save_with_retry(store, event).map_err(|e| RedefinitionError::EngineError(e.to_string()))?;

    let instances_updated = EventPayload::InstancesUpdated {
        class_name: class_name.clone(),
        updated_instance_count: outcome.updated_instance_count,
        strategy: outcome.strategy,
        partial: outcome.partial,
        errors: outcome.errors,
        preceding_event_id: event.event_id().clone(),
    };
    let factory = EventFactory::new(clock, id_gen);
    let instances_updated_event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        Some(&event),
        correlation_id,
        Some(event.event_id().clone()),
        None,
        instances_updated,
    );
    save_with_retry(store, instances_updated_event).map_err(|e| RedefinitionError::EngineError(e.to_string()))?;

    Ok(RedefinitionOutcome { event, snapshot })
}

/// Append a `RollbackSnapshotCaptured` fact for `snapshot` to `hotswap:<fqn>`
/// ahead of the VM call, so P4 ("every successful redefinition has an
/// earlier rollback snapshot in the store") holds by replay, not just by an
/// in-memory value the caller might discard.
fn record_snapshot(
    store: &dyn EventStore,
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    class_name: &ClassName,
    snapshot: &RollbackSnapshot,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> Result<Event, RedefinitionError> {
    let previous = store
        .events_for("hotswap", class_name.as_str())
        .map_err(|e| RedefinitionError::EngineError(e.to_string()))?;
    let previous = previous.last().cloned();
    let factory = EventFactory::new(clock, id_gen);
    let payload = EventPayload::RollbackSnapshotCaptured {
        snapshot_id: snapshot.snapshot_id.clone(),
        class_name: class_name.clone(),
        prior_snapshot_id: snapshot.prior_snapshot_id.clone(),
    };
    let event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        previous.as_ref(),
        correlation_id,
        causation_id,
        None,
        payload,
    );
    save_with_retry(store, event).map_err(|e| RedefinitionError::EngineError(e.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn failure_event(
    store: &dyn EventStore,
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    class_name: &ClassName,
    class_file: PathBuf,
    reason: String,
    vm_error: String,
    recovery_action: String,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> Result<Event, RedefinitionError> {
    let previous = store
        .events_for("hotswap", class_name.as_str())
        .map_err(|e| RedefinitionError::EngineError(e.to_string()))?;
    let previous = previous.last().cloned();
    let preceding_event_id = causation_id.clone().unwrap_or_else(|| EventId::new(id_gen.next()));
    let factory = EventFactory::new(clock, id_gen);
    let payload = EventPayload::ClassRedefinitionFailed {
        class_name: class_name.clone(),
        class_file,
        reason,
        vm_error,
        recovery_action,
        preceding_event_id,
    };
    let event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        previous.as_ref(),
        correlation_id,
        causation_id,
        None,
        payload,
    );
    save_with_retry(store, event).map_err(|e| RedefinitionError::EngineError(e.to_string()))
}

fn empty_snapshot(id_gen: &dyn IdGen, clock: &dyn Clock, class_name: &ClassName) -> RollbackSnapshot {
    RollbackSnapshot::new(SnapshotId::new(id_gen.next()), class_name.clone(), clock.now(), Vec::new(), Vec::new(), Default::default(), None)
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
