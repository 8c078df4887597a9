// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_adapters::test_support::{FakeInstanceRegistry, FakeVm};
use bh_adapters::InstanceHandle;
use bh_core::{ClassMetadata, FieldDescriptor, SequentialIdGen, SystemClock};
use bh_store::InMemoryEventStore;
use std::time::Duration;

fn metadata_bytes(fields: &[(&str, &str)]) -> Vec<u8> {
    let metadata = ClassMetadata {
        class_name: "com.ex.A".to_string(),
        super_class: Some("java.lang.Object".to_string()),
        interfaces: Default::default(),
        fields: fields
            .iter()
            .map(|(name, ty)| FieldDescriptor::new(*name, *ty))
            .collect(),
        methods: Default::default(),
    };
    serde_json::to_vec(&metadata).unwrap()
}

async fn wait_until(store: &Arc<InMemoryEventStore>, predicate: impl Fn(&[Event]) -> bool) -> Vec<Event> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let events = store.events_for("hotswap", "com.ex.A").unwrap();
        if predicate(&events) {
            return events;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for expected events, got: {events:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn build_engine(store: Arc<InMemoryEventStore>, vm: FakeVm, registry: FakeInstanceRegistry) -> Arc<Engine> {
    Arc::new(Engine::new(
        store,
        Arc::new(vm),
        Arc::new(registry),
        vec![],
        Arc::new(SystemClock),
        Arc::new(SequentialIdGen::new("rt")),
        Timeouts::default(),
        AccessFlagPolicy::Forbidden,
        2,
    ))
}

#[tokio::test]
async fn a_new_compatible_class_file_swaps_successfully() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("com/ex")).unwrap();

    let store = Arc::new(InMemoryEventStore::new());
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let registry = FakeInstanceRegistry::new();
    registry.register("com.ex.A", vec![InstanceHandle("i1".into())]);

    let engine = build_engine(store.clone(), vm, registry);
    let config = FileWatchConfig {
        root: dir.path().to_path_buf(),
        debounce: Duration::from_millis(30),
        ..Default::default()
    };
    let _shutdown = engine.attach(config);
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::write(dir.path().join("com/ex/A.class"), metadata_bytes(&[("count", "I")])).unwrap();

    let events = wait_until(&store, |events| {
        events
            .iter()
            .any(|e| matches!(e.payload, EventPayload::InstancesUpdated { .. }))
    })
    .await;

    let type_names: Vec<_> = events.iter().map(|e| e.type_name()).collect();
    assert_eq!(
        type_names,
        vec![
            "class_file_created",
            "class_metadata_extracted",
            "bytecode_validated",
            "hot_swap_requested",
            "rollback_snapshot_captured",
            "class_redefinition_succeeded",
            "instances_updated",
        ]
    );
}

#[tokio::test]
async fn adding_a_field_is_rejected_without_requesting_a_swap() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("com/ex")).unwrap();

    let store = Arc::new(InMemoryEventStore::new());
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let registry = FakeInstanceRegistry::new();

    let engine = build_engine(store.clone(), vm, registry);
    let config = FileWatchConfig {
        root: dir.path().to_path_buf(),
        debounce: Duration::from_millis(30),
        ..Default::default()
    };
    let _shutdown = engine.attach(config);
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::write(dir.path().join("com/ex/A.class"), metadata_bytes(&[])).unwrap();

    wait_until(&store, |events| {
        events.iter().any(|e| matches!(e.payload, EventPayload::BytecodeValidated { .. }))
    })
    .await;

    std::fs::write(dir.path().join("com/ex/A.class"), metadata_bytes(&[("x", "I")])).unwrap();

    let events = wait_until(&store, |events| {
        events.iter().any(|e| matches!(e.payload, EventPayload::BytecodeRejected { .. }))
    })
    .await;

    assert!(!events.iter().any(|e| matches!(e.payload, EventPayload::HotSwapRequested { .. })));
    let rejected = events
        .iter()
        .find_map(|e| match &e.payload {
            EventPayload::BytecodeRejected { rejected_changes, recovery_action, .. } => {
                Some((rejected_changes.clone(), recovery_action.clone()))
            }
            _ => None,
        })
        .unwrap();
    assert!(rejected.0.iter().any(|c| c.member.contains('x')));
    assert!(rejected.1.to_lowercase().contains("restart"));
}
