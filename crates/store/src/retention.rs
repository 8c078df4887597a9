// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention pruning for rollback snapshots (`store.retention_events`, §6).
//!
//! The event log itself is never compacted (§6: "compaction is out of
//! scope"); what `store.retention_events` bounds is how many *rollback
//! snapshots* per class are kept once they are no longer needed — a snapshot
//! becomes eligible once the redefinition it guarded has succeeded and a
//! newer snapshot supersedes it (§3 Ownership/lifecycle: "on success they
//! become eligible for retention-policy pruning; on failure they are
//! retained until an explicit rollback completes").

use crate::snapshot_store::{SnapshotStore, SnapshotStoreError};
use bh_core::RollbackSnapshot;

/// Prune a snapshot chain down to `retention` entries (newest first), never
/// touching the newest snapshot and never pruning anything if `retention`
/// is 0 (unbounded, per §6 default semantics).
pub fn prune_chain(
    store: &SnapshotStore,
    chain: &[RollbackSnapshot],
    retention: usize,
) -> Result<usize, SnapshotStoreError> {
    if retention == 0 || chain.len() <= retention {
        return Ok(0);
    }

    let mut pruned = 0;
    for snapshot in &chain[retention..] {
        let path = store.root().join(format!("{}.json", snapshot.snapshot_id.as_str()));
        if path.exists() {
            std::fs::remove_file(&path)?;
            pruned += 1;
        }
    }
    Ok(pruned)
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
