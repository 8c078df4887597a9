// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration as StdDuration;
use tokio::time::timeout;

async fn recv_within(rx: &mut mpsc::Receiver<FileWatchEvent>, millis: u64) -> Option<FileWatchEvent> {
    timeout(StdDuration::from_millis(millis), rx.recv()).await.ok().flatten()
}

#[tokio::test]
async fn a_single_create_emits_one_created_event() {
    let dir = tempfile::tempdir().unwrap();
    let config = FileWatchConfig {
        root: dir.path().to_path_buf(),
        debounce: StdDuration::from_millis(50),
        ..Default::default()
    };
    let (tx, mut rx) = mpsc::channel(32);
    let _shutdown = start(config, tx);

    tokio::time::sleep(StdDuration::from_millis(50)).await;
    std::fs::write(dir.path().join("A.class"), b"stub").unwrap();

    let event = recv_within(&mut rx, 500).await.expect("expected a created event");
    match event {
        FileWatchEvent::Created { class_name, .. } => {
            assert_eq!(class_name.as_str(), "A");
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_writes_within_debounce_collapse_to_one_event() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("A.class");
    std::fs::write(&path, b"v0").unwrap();

    let config = FileWatchConfig {
        root: dir.path().to_path_buf(),
        debounce: StdDuration::from_millis(150),
        ..Default::default()
    };
    let (tx, mut rx) = mpsc::channel(32);
    let _shutdown = start(config, tx);
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    for i in 1..=3 {
        std::fs::write(&path, format!("v{i}")).unwrap();
        tokio::time::sleep(StdDuration::from_millis(20)).await;
    }

    let first = recv_within(&mut rx, 1000).await.expect("expected one coalesced event");
    assert!(matches!(first, FileWatchEvent::Changed { .. } | FileWatchEvent::Created { .. }));
    // no second event should follow immediately.
    assert!(recv_within(&mut rx, 100).await.is_none());
}

#[tokio::test]
async fn excluded_paths_never_emit() {
    let dir = tempfile::tempdir().unwrap();
    let config = FileWatchConfig {
        root: dir.path().to_path_buf(),
        exclude: vec![GlobPattern::new("**/*Test.class")],
        debounce: StdDuration::from_millis(50),
        ..Default::default()
    };
    let (tx, mut rx) = mpsc::channel(32);
    let _shutdown = start(config, tx);
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    std::fs::write(dir.path().join("ATest.class"), b"stub").unwrap();

    assert!(recv_within(&mut rx, 300).await.is_none());
}
