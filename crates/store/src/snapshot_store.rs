// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for `RollbackSnapshot`s (§4.6).
//!
//! Each snapshot is one JSON file named after its `snapshot_id`, written
//! atomically (write to `.tmp`, fsync, rename) so a crash mid-capture can
//! never leave a half-written snapshot on disk — the same recovery posture
//! the teacher applies to its own state snapshots.

use bh_core::{RollbackSnapshot, SnapshotId};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory of per-class rollback snapshot chains.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &SnapshotId) -> PathBuf {
        self.root.join(format!("{}.json", id.as_str()))
    }

    /// Save a snapshot atomically.
    pub fn save(&self, snapshot: &RollbackSnapshot) -> Result<(), SnapshotStoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(&snapshot.snapshot_id);
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, snapshot)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load a snapshot by id. Returns `Ok(None)` if absent or unreadable;
    /// corrupt files are rotated to `.bak` instead of failing the caller, so
    /// the engine can still fall back to an earlier snapshot in the chain.
    pub fn load(&self, id: &SnapshotId) -> Result<Option<RollbackSnapshot>, SnapshotStoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                let bak_path = crate::wal::rotate_bak_path(&path);
                warn!(error = %e, path = %path.display(), bak = %bak_path.display(), "corrupt snapshot, moving to .bak");
                fs::rename(&path, &bak_path)?;
                Ok(None)
            }
        }
    }

    /// Walk the chain starting at `id`, following `prior_snapshot_id` links,
    /// oldest last.
    pub fn chain(&self, id: &SnapshotId) -> Result<Vec<RollbackSnapshot>, SnapshotStoreError> {
        let mut chain = Vec::new();
        let mut current = Some(id.clone());
        while let Some(id) = current {
            match self.load(&id)? {
                Some(snapshot) => {
                    current = snapshot.prior_snapshot_id.clone();
                    chain.push(snapshot);
                }
                None => break,
            }
        }
        Ok(chain)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "snapshot_store_tests.rs"]
mod tests;
