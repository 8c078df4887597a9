// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_adapters::test_support::{FakeInstanceRegistry, FakeVm};
use bh_core::{ClassName, EventPayload, FakeClock, FrameworkMetadata, SequentialIdGen, SnapshotId};
use bh_store::{EventStore, InMemoryEventStore};
use chrono::{TimeZone, Utc};

fn snapshot(class: &str) -> RollbackSnapshot {
    RollbackSnapshot::new(
        SnapshotId::new(format!("snap-{class}")),
        ClassName::new(class),
        chrono::Utc::now(),
        vec![9, 9, 9],
        vec![],
        FrameworkMetadata::default(),
        None,
    )
}

#[tokio::test]
async fn apply_single_restores_when_class_is_loaded() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let registry = FakeInstanceRegistry::new();
    let adapters: Vec<Box<dyn bh_adapters::FrameworkAdapter>> = vec![];

    let entry = apply_single(
        &vm,
        &registry,
        &adapters,
        &snapshot("com.ex.A"),
        CorrelationId::new("corr-1"),
        None,
    )
    .await;

    assert_eq!(entry.outcome, RollbackOutcome::Restored);
    assert_eq!(vm.redefinitions(), vec![("com.ex.A".to_string(), vec![9, 9, 9])]);
}

#[tokio::test]
async fn apply_single_aborts_when_class_no_longer_loaded() {
    let vm = FakeVm::new();
    let registry = FakeInstanceRegistry::new();
    let adapters: Vec<Box<dyn bh_adapters::FrameworkAdapter>> = vec![];

    let entry = apply_single(
        &vm,
        &registry,
        &adapters,
        &snapshot("com.ex.Gone"),
        CorrelationId::new("corr-1"),
        None,
    )
    .await;

    assert!(matches!(entry.outcome, RollbackOutcome::Aborted { .. }));
}

#[tokio::test]
async fn apply_plan_stops_at_first_abort() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    // com.ex.B is intentionally never loaded.
    let registry = FakeInstanceRegistry::new();
    let adapters: Vec<Box<dyn bh_adapters::FrameworkAdapter>> = vec![];

    let plan = vec![snapshot("com.ex.B"), snapshot("com.ex.A")];
    let trail = apply_plan(&vm, &registry, &adapters, &plan, CorrelationId::new("corr-1"), None).await;

    assert_eq!(trail.0.len(), 1);
    assert!(trail.aborted());
}

#[test]
fn topological_order_places_dependencies_first() {
    let targets = vec!["com.ex.A".to_string(), "com.ex.B".to_string()];
    // A depends on B, so B must come first.
    let edges = vec![("com.ex.A".to_string(), "com.ex.B".to_string())];

    let order = topological_order(&targets, &edges);
    assert_eq!(order, vec!["com.ex.B".to_string(), "com.ex.A".to_string()]);
}

#[test]
fn topological_order_with_no_edges_preserves_input_order() {
    let targets = vec!["com.ex.A".to_string(), "com.ex.B".to_string()];
    assert_eq!(topological_order(&targets, &[]), targets);
}

#[tokio::test]
async fn perform_rollback_records_the_requested_and_completed_events() {
    let store = InMemoryEventStore::new();
    let clock = FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let id_gen = SequentialIdGen::new("id");
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let registry = FakeInstanceRegistry::new();
    let adapters: Vec<Box<dyn bh_adapters::FrameworkAdapter>> = vec![];

    let (entry, terminal) = perform_rollback(
        &store,
        &vm,
        &registry,
        &adapters,
        &clock,
        &id_gen,
        &snapshot("com.ex.A"),
        false,
        CorrelationId::new("corr-1"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(entry.outcome, RollbackOutcome::Restored);
    assert!(matches!(terminal.payload, EventPayload::RollbackCompleted { .. }));

    let events = store.events_for("hotswap", "com.ex.A").unwrap();
    let sequence: Vec<&str> = events.iter().map(|e| e.type_name()).collect();
    assert_eq!(sequence, vec!["rollback_requested", "rollback_completed"]);
}

#[tokio::test]
async fn perform_rollback_records_a_failed_event_when_the_class_is_gone() {
    let store = InMemoryEventStore::new();
    let clock = FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let id_gen = SequentialIdGen::new("id");
    let vm = FakeVm::new();
    let registry = FakeInstanceRegistry::new();
    let adapters: Vec<Box<dyn bh_adapters::FrameworkAdapter>> = vec![];

    let (entry, terminal) = perform_rollback(
        &store,
        &vm,
        &registry,
        &adapters,
        &clock,
        &id_gen,
        &snapshot("com.ex.Gone"),
        false,
        CorrelationId::new("corr-1"),
        None,
    )
    .await
    .unwrap();

    assert!(matches!(entry.outcome, RollbackOutcome::Aborted { .. }));
    assert!(matches!(terminal.payload, EventPayload::RollbackFailed { .. }));
}
