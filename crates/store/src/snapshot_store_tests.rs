// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_core::{ClassName, FrameworkMetadata};

fn snapshot(id: &str, prior: Option<&str>) -> RollbackSnapshot {
    RollbackSnapshot::new(
        SnapshotId::new(id),
        ClassName::new("com.ex.A"),
        chrono::Utc::now(),
        vec![1, 2, 3],
        vec![],
        FrameworkMetadata::default(),
        prior.map(SnapshotId::new),
    )
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    let snap = snapshot("snap-1", None);
    store.save(&snap).unwrap();

    let loaded = store.load(&snap.snapshot_id).unwrap().unwrap();
    assert_eq!(loaded, snap);
}

#[test]
fn load_missing_snapshot_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    assert!(store.load(&SnapshotId::new("missing")).unwrap().is_none());
}

#[test]
fn chain_follows_prior_snapshot_links_oldest_last() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    let first = snapshot("snap-1", None);
    let second = snapshot("snap-2", Some("snap-1"));
    store.save(&first).unwrap();
    store.save(&second).unwrap();

    let chain = store.chain(&second.snapshot_id).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].snapshot_id, second.snapshot_id);
    assert_eq!(chain[1].snapshot_id, first.snapshot_id);
}

#[test]
fn corrupt_snapshot_is_rotated_and_load_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    let snap = snapshot("snap-1", None);
    store.save(&snap).unwrap();

    std::fs::write(
        dir.path().join("snap-1.json"),
        b"{not valid json",
    )
    .unwrap();

    assert!(store.load(&snap.snapshot_id).unwrap().is_none());
    assert!(dir.path().join("snap-1.bak").exists());
}
