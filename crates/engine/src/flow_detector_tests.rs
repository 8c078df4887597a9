// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_core::test_support::TestEventFactory;
use bh_core::{ClassName, EventPayload, ReconciliationStrategy, SystemClock};
use chrono::Utc;

fn payload_for(type_name: &str, class_name: &ClassName) -> EventPayload {
    match type_name {
        "class_file_changed" => EventPayload::ClassFileChanged {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            file_size: 10,
            detected_at: Utc::now(),
        },
        "class_metadata_extracted" => EventPayload::ClassMetadataExtracted {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        },
        "bytecode_validated" => EventPayload::BytecodeValidated {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            metadata: bh_core::ClassMetadata {
                class_name: class_name.as_str().to_string(),
                super_class: None,
                interfaces: Default::default(),
                fields: Default::default(),
                methods: Default::default(),
            },
        },
        "hot_swap_requested" => EventPayload::HotSwapRequested {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            original_bytecode: vec![1],
            new_bytecode: vec![2],
            reason: "method body change".into(),
            preceding_event_id: bh_core::EventId::new("prev"),
        },
        "class_redefinition_succeeded" => EventPayload::ClassRedefinitionSucceeded {
            class_name: class_name.clone(),
            class_file: "A.class".into(),
            affected_instances: 1,
            details: "ok".into(),
            duration_ms: 5,
            preceding_event_id: bh_core::EventId::new("prev"),
        },
        "class_redefinition_failed" => EventPayload::ClassRedefinitionFailed {
            class_name: class_name.clone(),
            class_file: "A.class".into(),
            reason: "JVM rejected schema changes".into(),
            vm_error: "schema".into(),
            recovery_action: "Restart application to load new class definition".into(),
            preceding_event_id: bh_core::EventId::new("prev"),
        },
        "instances_updated" => EventPayload::InstancesUpdated {
            class_name: class_name.clone(),
            updated_instance_count: 1,
            strategy: ReconciliationStrategy::CacheInvalidation,
            partial: false,
            errors: vec![],
            preceding_event_id: bh_core::EventId::new("prev"),
        },
        other => panic!("no fixture payload for {other}"),
    }
}

fn sequence_events(factory: &TestEventFactory, class_name: &ClassName, type_names: &[&str], seconds_apart: i64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut previous = None;
    for (i, type_name) in type_names.iter().enumerate() {
        if i > 0 {
            factory.advance(seconds_apart);
        }
        let event = factory.next_hotswap_event(class_name, previous.as_ref(), payload_for(type_name, class_name));
        previous = Some(event.clone());
        events.push(event);
    }
    events
}

#[test]
fn full_sequence_within_window_is_detected_with_high_confidence() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let events = sequence_events(&factory, &class_name, &Flow::hot_swap_complete().event_sequence, 1);

    let clock = SystemClock;
    let result = evaluate(&Flow::hot_swap_complete(), &events, 0.9, &clock);

    let matched = result.expect("expected a flow match");
    assert_eq!(matched.flow_id, "hot-swap-complete");
    assert!(matched.confidence >= 0.9, "confidence was {}", matched.confidence);
    assert_eq!(matched.triggering_events.len(), 6);
}

#[test]
fn run_below_minimum_event_count_is_not_detected() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let events = sequence_events(&factory, &class_name, &["class_file_changed", "class_metadata_extracted"], 1);

    let clock = SystemClock;
    let result = evaluate(&Flow::hot_swap_complete(), &events, 0.5, &clock);

    assert!(result.is_none());
}

#[test]
fn exceeding_time_window_drags_confidence_below_threshold() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    // Full sequence, but spread across 60s, twice the 30s window.
    let events = sequence_events(&factory, &class_name, &Flow::hot_swap_complete().event_sequence, 12);

    let clock = SystemClock;
    let result = evaluate(&Flow::hot_swap_complete(), &events, 0.9, &clock);

    assert!(result.is_none());
}

#[test]
fn unrelated_interleaved_events_do_not_break_the_match() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let noise_class = ClassName::new("com.ex.Unrelated");

    let mut events = Vec::new();
    let mut previous = None;
    for type_name in Flow::hot_swap_complete().event_sequence {
        let noise = factory.next_hotswap_event(&noise_class, None, payload_for("class_file_changed", &noise_class));
        events.push(noise);
        factory.advance(1);
        let event = factory.next_hotswap_event(&class_name, previous.as_ref(), payload_for(type_name, &class_name));
        previous = Some(event.clone());
        events.push(event);
        factory.advance(1);
    }

    let clock = SystemClock;
    let result = evaluate(&Flow::hot_swap_complete(), &events, 0.9, &clock);
    assert!(result.is_some());
}

#[test]
fn detect_all_matches_error_recovery_flow_independently() {
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let event = factory.next_hotswap_event(&class_name, None, payload_for("class_redefinition_failed", &class_name));

    let clock = SystemClock;
    let matches = detect_all(&Flow::built_ins(), std::slice::from_ref(&event), 0.5, &clock);

    assert!(matches.iter().any(|m| m.flow_id == "error-recovery"));
}
