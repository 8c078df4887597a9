// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_core::test_support::TestEventFactory;
use bh_core::{ClassName, EventPayload};

fn changed(class_name: &ClassName) -> EventPayload {
    EventPayload::ClassFileChanged {
        class_file: "A.class".into(),
        class_name: class_name.clone(),
        file_size: 1,
        detected_at: chrono::Utc::now(),
    }
}

#[test]
fn save_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");

    {
        let store = FileEventStore::open(&path).unwrap();
        let event = factory.next_hotswap_event(&class_name, None, changed(&class_name));
        store.save(event).unwrap();
    }

    let reopened = FileEventStore::open(&path).unwrap();
    let events = reopened.events_for("hotswap", "com.ex.A").unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].aggregate_version(), 1);
}

#[test]
fn reopen_preserves_current_version_for_further_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");

    let first = factory.next_hotswap_event(&class_name, None, changed(&class_name));
    {
        let store = FileEventStore::open(&path).unwrap();
        store.save(first.clone()).unwrap();
    }

    let store = FileEventStore::open(&path).unwrap();
    let second = factory.next_hotswap_event(&class_name, Some(&first), changed(&class_name));
    let saved = store.save(second).unwrap();
    assert_eq!(saved.aggregate_version(), 2);
}
