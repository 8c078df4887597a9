// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot & rollback engine (§4.6): restores a prior class image and
//! instance state, singly or as a cascading plan.
//!
//! Restoring "instance state" never means rewriting field values directly —
//! the validator (§4.3) guarantees the field set never changes across a
//! redefinition, so there is nothing to write back. What a rollback restores
//! beyond bytecode is the same thing the reconciler already does for a
//! forward swap: cache invalidation plus a framework-adapter refresh pass.

use crate::reconciler;
use bh_adapters::{FrameworkAdapter, InstanceRegistry, VmInstrumentation};
use bh_core::{
    Clock, CorrelationId, Event, EventFactory, EventId, EventPayload, IdGen, RollbackAuditEntry,
    RollbackOutcome, RollbackSnapshot,
};
use bh_store::EventStore;
use tracing::info;

/// Ordered list of rollback audit entries, one per snapshot applied.
#[derive(Debug, Clone, Default)]
pub struct RollbackAuditTrail(pub Vec<RollbackAuditEntry>);

impl RollbackAuditTrail {
    pub fn aborted(&self) -> bool {
        self.0.last().is_some_and(|e| matches!(e.outcome, RollbackOutcome::Aborted { .. }))
    }
}

/// Apply a single snapshot: re-invoke the VM redefinition primitive with the
/// snapshot's bytecode, then reconcile instances the same way a forward
/// swap would.
pub async fn apply_single(
    vm: &dyn VmInstrumentation,
    registry: &dyn InstanceRegistry,
    adapters: &[Box<dyn FrameworkAdapter>],
    snapshot: &RollbackSnapshot,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> RollbackAuditEntry {
    let outcome = match vm.find_loaded_class(snapshot.class_name.as_str()).await {
        None => RollbackOutcome::Aborted {
            reason: format!("class {} is no longer loaded", snapshot.class_name),
        },
        Some(handle) => match vm.redefine_class(&handle, &snapshot.prior_bytecode).await {
            Err(e) => RollbackOutcome::Aborted { reason: e.to_string() },
            Ok(()) => {
                reconciler::reconcile(&snapshot.class_name, registry, adapters).await;
                RollbackOutcome::Restored
            }
        },
    };

    RollbackAuditEntry {
        snapshot_id: snapshot.snapshot_id.clone(),
        class_name: snapshot.class_name.clone(),
        correlation_id,
        causation_id,
        outcome,
    }
}

/// Apply an ordered plan of snapshots (already sorted dependency-
/// topologically, classes with no incoming edges first, and reverse
/// temporal order within a class). Aborts the remaining plan on the first
/// unrecoverable failure (§4.6 "Cascading rollback").
pub async fn apply_plan(
    vm: &dyn VmInstrumentation,
    registry: &dyn InstanceRegistry,
    adapters: &[Box<dyn FrameworkAdapter>],
    plan: &[RollbackSnapshot],
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> RollbackAuditTrail {
    let mut trail = RollbackAuditTrail::default();
    for snapshot in plan {
        let entry = apply_single(
            vm,
            registry,
            adapters,
            snapshot,
            correlation_id.clone(),
            causation_id.clone(),
        )
        .await;
        let aborted = matches!(entry.outcome, RollbackOutcome::Aborted { .. });
        trail.0.push(entry);
        if aborted {
            break;
        }
    }
    trail
}

/// Apply a single snapshot and record the attempt on `hotswap:<fqn>`: a
/// `RollbackRequested` event before the VM call, then `RollbackCompleted` or
/// `RollbackFailed` once `apply_single` resolves (§4.6 "the engine never
/// rolls back silently — every rollback emits an audit trail").
#[allow(clippy::too_many_arguments)]
pub async fn perform_rollback(
    store: &dyn EventStore,
    vm: &dyn VmInstrumentation,
    registry: &dyn InstanceRegistry,
    adapters: &[Box<dyn FrameworkAdapter>],
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    snapshot: &RollbackSnapshot,
    cascade: bool,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
) -> Result<(RollbackAuditEntry, Event), crate::error::RollbackError> {
    let class_name = &snapshot.class_name;

    let requested = append_hotswap_event(
        store,
        clock,
        id_gen,
        class_name,
        correlation_id.clone(),
        causation_id.clone(),
        EventPayload::RollbackRequested {
            snapshot_id: snapshot.snapshot_id.clone(),
            class_name: class_name.clone(),
            cascade,
        },
    )
    .map_err(|e| crate::error::RollbackError::RollbackAborted(e.to_string()))?;

    let entry = apply_single(vm, registry, adapters, snapshot, correlation_id.clone(), causation_id).await;

    let payload = match &entry.outcome {
        RollbackOutcome::Restored => EventPayload::RollbackCompleted {
            snapshot_id: snapshot.snapshot_id.clone(),
            class_name: class_name.clone(),
            entries: vec![entry.clone()],
            preceding_event_id: requested.event_id().clone(),
        },
        RollbackOutcome::Aborted { reason } => EventPayload::RollbackFailed {
            snapshot_id: snapshot.snapshot_id.clone(),
            class_name: class_name.clone(),
            reason: reason.clone(),
            preceding_event_id: requested.event_id().clone(),
        },
        RollbackOutcome::Skipped { reason } => {
            info!(class = %class_name, %reason, "rollback skipped");
            EventPayload::RollbackCompleted {
                snapshot_id: snapshot.snapshot_id.clone(),
                class_name: class_name.clone(),
                entries: vec![entry.clone()],
                preceding_event_id: requested.event_id().clone(),
            }
        }
    };

    let terminal = append_hotswap_event(
        store,
        clock,
        id_gen,
        class_name,
        correlation_id,
        Some(requested.event_id().clone()),
        payload,
    )
    .map_err(|e| crate::error::RollbackError::RollbackAborted(e.to_string()))?;

    Ok((entry, terminal))
}

fn append_hotswap_event(
    store: &dyn EventStore,
    clock: &dyn Clock,
    id_gen: &dyn IdGen,
    class_name: &bh_core::ClassName,
    correlation_id: CorrelationId,
    causation_id: Option<EventId>,
    payload: EventPayload,
) -> Result<Event, bh_store::StoreError> {
    let previous = store.events_for("hotswap", class_name.as_str())?;
    let factory = EventFactory::new(clock, id_gen);
    let event = factory.build(
        bh_core::AggregateType::hot_swap(class_name.clone()),
        previous.last(),
        correlation_id,
        causation_id,
        None,
        payload,
    );
    crate::coordinator::save_with_retry(store, event)
}

/// Sort targets into dependency-topological order (classes other classes
/// depend on come first) given an explicit dependency edge list (`(from,
/// depends_on)` pairs). Falls back to input order for classes with no
/// recorded edges. A cycle leaves the cyclic members in their input order
/// rather than failing, since a best-effort rollback still has to proceed.
pub fn topological_order(targets: &[String], edges: &[(String, String)]) -> Vec<String> {
    use std::collections::{HashMap, HashSet};

    let mut in_degree: HashMap<&str, usize> = targets.iter().map(|t| (t.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, depends_on) in edges {
        if targets.iter().any(|t| t == from) && targets.iter().any(|t| t == depends_on) {
            *in_degree.entry(from.as_str()).or_insert(0) += 1;
            dependents.entry(depends_on.as_str()).or_default().push(from.as_str());
        }
    }

    let mut ready: Vec<&str> = targets
        .iter()
        .map(|t| t.as_str())
        .filter(|t| in_degree.get(t).copied().unwrap_or(0) == 0)
        .collect();
    let mut ordered = Vec::with_capacity(targets.len());
    let mut seen = HashSet::new();

    while let Some(next) = ready.first().copied() {
        ready.remove(0);
        if !seen.insert(next) {
            continue;
        }
        ordered.push(next.to_string());
        if let Some(deps) = dependents.get(next) {
            for dependent in deps {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.push(dependent);
                    }
                }
            }
        }
    }

    for target in targets {
        if seen.insert(target.as_str()) {
            ordered.push(target.clone());
        }
    }
    ordered
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
