// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL event write-ahead log.
//!
//! Events are appended as one self-describing JSON record per line
//! (`{"stream_position":N,"event":{...}}\n`), durable before `append`
//! returns, giving the on-disk layout required by §6 ("Persisted event
//! record") without a binary framing format. Corrupt tails are rotated to
//! `.bak` rather than failing the whole log, the same posture the teacher
//! applies to its own WAL and snapshots.

use bh_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct WalRecord {
    stream_position: u64,
    event: Event,
}

/// Append-only JSONL log of every event ever saved, in global order.
pub struct Wal {
    file: File,
    path: PathBuf,
}

impl Wal {
    /// Open (creating if absent) the WAL at `path`.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Append one event and fsync before returning, so a crash immediately
    /// after `append` never loses it.
    pub fn append(&mut self, stream_position: u64, event: &Event) -> Result<(), WalError> {
        let record = WalRecord {
            stream_position,
            event: event.clone(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Replay every durable event in append order. Lines after the first
    /// corrupt one are dropped; the corrupt tail is rotated to `.bak` so
    /// recovery can proceed from the last good record.
    pub fn replay(path: &Path) -> Result<Vec<Event>, WalError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        let mut corrupt_at = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WalRecord>(&line) {
                Ok(record) => events.push(record.event),
                Err(e) => {
                    warn!(line = idx, error = %e, path = %path.display(), "corrupt WAL entry, truncating replay");
                    corrupt_at = Some(idx);
                    break;
                }
            }
        }

        if corrupt_at.is_some() {
            let bak_path = rotate_bak_path(path);
            warn!(path = %path.display(), bak = %bak_path.display(), valid_entries = events.len(), "rotating corrupt WAL to .bak");
            std::fs::rename(path, &bak_path)?;
            let mut clean = Wal::open(path)?;
            for (i, event) in events.iter().enumerate() {
                clean.append(i as u64, event)?;
            }
        }

        Ok(events)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Produce a timestamped-free `.bak` path next to `path` for a corrupt file,
/// without clobbering a previous `.bak`.
pub fn rotate_bak_path(path: &Path) -> PathBuf {
    let mut candidate = path.with_extension("bak");
    let mut n = 1;
    while candidate.exists() {
        candidate = path.with_extension(format!("bak.{n}"));
        n += 1;
    }
    candidate
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
