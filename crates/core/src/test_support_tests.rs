// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn chained_events_have_monotonic_versions() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let first = factory.next_hotswap_event(
        &class_name,
        None,
        EventPayload::ClassFileChanged {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            file_size: 10,
            detected_at: Utc::now(),
        },
    );
    assert_eq!(first.aggregate_version(), 1);
    assert_eq!(first.header.previous_event_id, None);

    let second = factory.next_hotswap_event(
        &class_name,
        Some(&first),
        EventPayload::ClassMetadataExtracted {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        },
    );
    assert_eq!(second.aggregate_version(), 2);
    assert_eq!(second.header.previous_event_id, Some(first.event_id().clone()));
    assert_eq!(second.header.causation_id, Some(first.event_id().clone()));
}
