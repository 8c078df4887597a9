// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn rollback_snapshot_round_trips_through_json() {
    let snapshot = RollbackSnapshot::new(
        SnapshotId::new("snap-1"),
        ClassName::new("com.ex.A"),
        Utc::now(),
        vec![1, 2, 3],
        vec![InstanceState {
            instance_ref: "inst-1".into(),
            fields: HashMap::new(),
        }],
        FrameworkMetadata::default(),
        None,
    );
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: RollbackSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, back);
}

#[test]
fn rollback_snapshot_chains_via_prior_snapshot_id() {
    let first = SnapshotId::new("snap-1");
    let second = RollbackSnapshot::new(
        SnapshotId::new("snap-2"),
        ClassName::new("com.ex.A"),
        Utc::now(),
        vec![],
        vec![],
        FrameworkMetadata::default(),
        Some(first.clone()),
    );
    assert_eq!(second.prior_snapshot_id, Some(first));
}
