// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bh-store: the append-only, per-aggregate event store (§4.1) and rollback
//! snapshot persistence (§4.6).

pub mod event_store;
pub mod file_store;
pub mod memory_store;
pub mod retention;
pub mod snapshot_store;
pub mod wal;

pub use event_store::{EventStore, StoreError, StoreResult};
pub use file_store::FileEventStore;
pub use memory_store::InMemoryEventStore;
pub use retention::prune_chain;
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
pub use wal::{rotate_bak_path, Wal, WalError};
