// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_core::test_support::TestEventFactory;
use bh_core::{ClassName, EventPayload};
use std::io::Write as _;

fn sample_event(factory: &TestEventFactory, class_name: &ClassName) -> Event {
    factory.next_hotswap_event(
        class_name,
        None,
        EventPayload::ClassFileChanged {
            class_file: "A.class".into(),
            class_name: class_name.clone(),
            file_size: 1,
            detected_at: chrono::Utc::now(),
        },
    )
}

#[test]
fn replay_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.jsonl");
    let events = Wal::replay(&path).unwrap();
    assert!(events.is_empty());
}

#[test]
fn append_then_replay_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let event = sample_event(&factory, &class_name);

    let mut wal = Wal::open(&path).unwrap();
    wal.append(0, &event).unwrap();
    drop(wal);

    let replayed = Wal::replay(&path).unwrap();
    assert_eq!(replayed, vec![event]);
}

#[test]
fn replay_truncates_at_corrupt_line_and_rotates_to_bak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let factory = TestEventFactory::new();
    let class_name = ClassName::new("com.ex.A");
    let event = sample_event(&factory, &class_name);

    let mut wal = Wal::open(&path).unwrap();
    wal.append(0, &event).unwrap();
    drop(wal);

    // Corrupt the tail by appending a truncated JSON line.
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{not valid json").unwrap();
    drop(file);

    let replayed = Wal::replay(&path).unwrap();
    assert_eq!(replayed, vec![event]);
    assert!(path.with_extension("bak").exists());
}
