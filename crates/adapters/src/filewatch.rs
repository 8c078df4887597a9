// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-watch session (§4.2): observes a root recursively, honoring
//! include/exclude globs, and emits one coalesced change per debounce window.
//!
//! Grounded on the teacher's `oj-adapters::agent::watcher` pattern — a
//! `notify` watcher feeding a channel, read from a `tokio::select!` loop
//! alongside a timer and a shutdown signal — generalized from a single log
//! file to a recursive directory tree with glob filtering and per-path
//! debounce coalescing.

use crate::glob::GlobPattern;
use bh_core::ClassName;
use chrono::{DateTime, Utc};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A coalesced, structural file-watch outcome. Deliberately not a full
/// `bh_core::Event`: this layer has no notion of aggregate version or
/// correlation id, that belongs to whoever appends these to the event store.
#[derive(Debug, Clone, PartialEq)]
pub enum FileWatchEvent {
    Changed {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },
    Created {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },
    Deleted {
        class_file: PathBuf,
        class_name: ClassName,
        file_size: u64,
        detected_at: DateTime<Utc>,
    },
    QueueOverflow {
        class_file: PathBuf,
        dropped_event_summary: String,
    },
    Stopped {
        path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FileWatchConfig {
    pub root: PathBuf,
    pub include: Vec<GlobPattern>,
    pub exclude: Vec<GlobPattern>,
    pub debounce: Duration,
    /// Capacity of the raw notify-event channel. Exceeding it for a path
    /// produces a `QueueOverflow` on the next flush for that path.
    pub raw_channel_capacity: usize,
}

impl Default for FileWatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: vec![GlobPattern::new("**/*.class")],
            exclude: vec![],
            debounce: Duration::from_millis(250),
            raw_channel_capacity: 256,
        }
    }
}

impl FileWatchConfig {
    fn is_watched(&self, relative: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(relative));
        let excluded = self.exclude.iter().any(|p| p.matches(relative));
        included && !excluded
    }
}

/// Start a file-watch session. Returns a shutdown handle; dropping or
/// signalling it stops the background task and the watcher.
pub fn start(config: FileWatchConfig, event_tx: mpsc::Sender<FileWatchEvent>) -> oneshot::Sender<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(run(config, event_tx, shutdown_rx));
    shutdown_tx
}

struct PendingChange {
    first_kind: ChangeKind,
    last_kind: ChangeKind,
    last_update: tokio::time::Instant,
}

async fn run(config: FileWatchConfig, event_tx: mpsc::Sender<FileWatchEvent>, mut shutdown_rx: oneshot::Receiver<()>) {
    let (raw_tx, mut raw_rx) = mpsc::channel::<(PathBuf, ChangeKind)>(config.raw_channel_capacity);
    let dropped = Arc::new(AtomicU32::new(0));
    let _watcher = match create_watcher(&config.root, raw_tx, Arc::clone(&dropped)) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(root = %config.root.display(), error = %e, "file watch session failed to start");
            let _ = event_tx
                .send(FileWatchEvent::Stopped {
                    path: config.root.clone(),
                    reason: e.to_string(),
                })
                .await;
            return;
        }
    };

    let mut pending: HashMap<PathBuf, PendingChange> = HashMap::new();
    let tick = tokio::time::interval(tick_interval(config.debounce));
    tokio::pin!(tick);

    loop {
        tokio::select! {
            Some((path, kind)) = raw_rx.recv() => {
                record_change(&config, &mut pending, path, kind);
            }
            _ = tick.tick() => {
                flush_due(&config, &mut pending, &event_tx).await;
                report_drops(&config, &dropped, &event_tx).await;
            }
            _ = &mut shutdown_rx => {
                flush_all(&config, &mut pending, &event_tx).await;
                break;
            }
        }
    }
}

fn tick_interval(debounce: Duration) -> Duration {
    std::cmp::max(debounce / 4, Duration::from_millis(10))
}

fn record_change(
    config: &FileWatchConfig,
    pending: &mut HashMap<PathBuf, PendingChange>,
    path: PathBuf,
    kind: ChangeKind,
) {
    let Ok(relative) = path.strip_prefix(&config.root) else {
        return;
    };
    if !config.is_watched(relative.to_string_lossy().as_ref()) {
        return;
    }

    match pending.get_mut(&path) {
        Some(entry) => {
            entry.last_kind = kind;
            entry.last_update = tokio::time::Instant::now();
        }
        None => {
            pending.insert(
                path,
                PendingChange {
                    first_kind: kind,
                    last_kind: kind,
                    last_update: tokio::time::Instant::now(),
                },
            );
        }
    }
}

async fn report_drops(
    config: &FileWatchConfig,
    dropped: &AtomicU32,
    event_tx: &mpsc::Sender<FileWatchEvent>,
) {
    let count = dropped.swap(0, Ordering::Relaxed);
    if count > 0 {
        let _ = event_tx
            .send(FileWatchEvent::QueueOverflow {
                class_file: config.root.clone(),
                dropped_event_summary: format!("{count} raw event(s) dropped under backpressure"),
            })
            .await;
    }
}

async fn flush_due(
    config: &FileWatchConfig,
    pending: &mut HashMap<PathBuf, PendingChange>,
    event_tx: &mpsc::Sender<FileWatchEvent>,
) {
    let now = tokio::time::Instant::now();
    let due: Vec<PathBuf> = pending
        .iter()
        .filter(|(_, entry)| now.duration_since(entry.last_update) >= config.debounce)
        .map(|(path, _)| path.clone())
        .collect();

    for path in due {
        if let Some(entry) = pending.remove(&path) {
            emit(config, event_tx, &path, entry).await;
        }
    }
}

async fn flush_all(
    config: &FileWatchConfig,
    pending: &mut HashMap<PathBuf, PendingChange>,
    event_tx: &mpsc::Sender<FileWatchEvent>,
) {
    for (path, entry) in pending.drain() {
        emit(config, event_tx, &path, entry).await;
    }
}

async fn emit(
    config: &FileWatchConfig,
    event_tx: &mpsc::Sender<FileWatchEvent>,
    path: &Path,
    entry: PendingChange,
) {
    let Some(class_name) = ClassName::from_class_file(&config.root, path) else {
        return;
    };

    let detected_at = Utc::now();
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    if entry.first_kind == ChangeKind::Created && entry.last_kind == ChangeKind::Deleted {
        let _ = event_tx
            .send(FileWatchEvent::Created {
                class_file: path.to_path_buf(),
                class_name: class_name.clone(),
                file_size,
                detected_at,
            })
            .await;
        let _ = event_tx
            .send(FileWatchEvent::Deleted {
                class_file: path.to_path_buf(),
                class_name,
                file_size: 0,
                detected_at,
            })
            .await;
        return;
    }

    let event = match entry.last_kind {
        ChangeKind::Created => FileWatchEvent::Created {
            class_file: path.to_path_buf(),
            class_name,
            file_size,
            detected_at,
        },
        ChangeKind::Modified => FileWatchEvent::Changed {
            class_file: path.to_path_buf(),
            class_name,
            file_size,
            detected_at,
        },
        ChangeKind::Deleted => FileWatchEvent::Deleted {
            class_file: path.to_path_buf(),
            class_name,
            file_size: 0,
            detected_at,
        },
    };
    let _ = event_tx.send(event).await;
}

fn create_watcher(
    root: &Path,
    raw_tx: mpsc::Sender<(PathBuf, ChangeKind)>,
    dropped: Arc<AtomicU32>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        let Ok(event) = res else { return };
        let Some(kind) = classify(&event.kind) else {
            return;
        };
        for path in event.paths {
            if raw_tx.try_send((path, kind)).is_err() {
                dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

fn classify(kind: &notify::EventKind) -> Option<ChangeKind> {
    use notify::EventKind;
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

#[cfg(test)]
#[path = "filewatch_tests.rs"]
mod tests;
