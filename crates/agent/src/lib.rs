// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bh-agent: wires a configured, durable `bh-engine::Engine` to the
//! host-supplied capabilities (§6) and a file-watch session, per the
//! enumerated `bytehot.toml` keys.

pub mod config;

use bh_adapters::filewatch::FileWatchConfig;
use bh_adapters::glob::GlobPattern;
use bh_adapters::{FrameworkAdapter, InstanceRegistry, VmInstrumentation};
use bh_core::{Clock, IdGen, SystemClock, UuidIdGen};
use bh_engine::{AccessFlagPolicy, Engine, Timeouts};
use bh_store::{EventStore, FileEventStore, WalError};
use config::Config;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("event store unavailable at {0}")]
    Store(#[from] WalError),
    #[error("host VM does not support redefinition; the engine refuses to attach")]
    RedefinitionUnsupported,
}

/// Host-specific collaborators the agent cannot supply on its own (§6: VM
/// instrumentation, instance enumeration, zero or more framework adapters).
pub struct Capabilities {
    pub vm: Arc<dyn VmInstrumentation>,
    pub registry: Arc<dyn InstanceRegistry>,
    pub adapters: Vec<Box<dyn FrameworkAdapter>>,
}

/// A running attachment: holds the file-watch shutdown handle so the caller
/// can stop the session cleanly.
pub struct RunningEngine {
    pub engine: Arc<Engine>,
    shutdown: oneshot::Sender<()>,
}

impl RunningEngine {
    /// Stop the file-watch session. The worker pool drains in-flight jobs on
    /// its own; this only stops new change events from being dispatched.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
    }
}

/// Build the durable event store, validate the VM capability, and start
/// watching `config.watch.root` (§5: "the file watcher is the external
/// clock; everything downstream is message-driven").
pub fn attach(config: &Config, capabilities: Capabilities) -> Result<RunningEngine, AttachError> {
    if !capabilities.vm.is_redefinition_supported() {
        return Err(AttachError::RedefinitionUnsupported);
    }

    let store: Arc<dyn EventStore> = Arc::new(FileEventStore::open(&config.store.path)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let id_gen: Arc<dyn IdGen> = Arc::new(UuidIdGen);

    let engine = Arc::new(Engine::new(
        store,
        capabilities.vm,
        capabilities.registry,
        capabilities.adapters,
        clock,
        id_gen,
        Timeouts {
            redefinition: std::time::Duration::from_millis(config.swap.redefinition_timeout_ms),
            reconciliation: std::time::Duration::from_millis(config.swap.reconciliation_timeout_ms),
        },
        AccessFlagPolicy::Forbidden,
        config.workers.pool_size,
    ));

    let watch_config = FileWatchConfig {
        root: config.watch.root.clone(),
        include: config.watch.include_globs.iter().map(|p| GlobPattern::new(p)).collect(),
        exclude: config.watch.exclude_globs.iter().map(|p| GlobPattern::new(p)).collect(),
        debounce: std::time::Duration::from_millis(config.watch.debounce_ms),
        ..FileWatchConfig::default()
    };
    let shutdown = engine.attach(watch_config);

    Ok(RunningEngine { engine, shutdown })
}
