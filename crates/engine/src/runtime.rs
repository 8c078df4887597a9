// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reactive wiring (§5): the file watcher is the only clock. Every change it
//! emits is driven end to end — metadata extraction, validation, hot-swap
//! request, redefinition, reconciliation — on a bounded worker pool, so the
//! system never runs more concurrent swaps than `workers.pool_size` allows.
//!
//! Grounded on the teacher's `oj-daemon` split between a listener task that
//! only decodes and hands off, and an executor pool bounded by a semaphore
//! (one permit per in-flight job), generalized from one job type to the
//! five-stage class-change pipeline.

use crate::coordinator::{self, RedefinitionOutcome, Timeouts};
use crate::error::EngineError;
use crate::metadata;
use crate::validator::{self, AccessFlagPolicy, ValidationOutcome};
use bh_adapters::filewatch::{self, FileWatchConfig, FileWatchEvent};
use bh_adapters::{FrameworkAdapter, InstanceRegistry, VmInstrumentation};
use bh_core::{AggregateType, ClassName, Clock, CorrelationId, Event, EventFactory, EventPayload, IdGen};
use bh_store::EventStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

/// Capabilities and tunables an attached engine needs to drive the pipeline.
/// One instance is built on agent attach and never mutated afterward (§5
/// "process-wide configuration structure... init on agent attach, read-only
/// thereafter").
pub struct Engine {
    pub store: Arc<dyn EventStore>,
    pub vm: Arc<dyn VmInstrumentation>,
    pub registry: Arc<dyn InstanceRegistry>,
    pub adapters: Arc<Vec<Box<dyn FrameworkAdapter>>>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGen>,
    pub timeouts: Timeouts,
    pub access_flag_policy: AccessFlagPolicy,
    pub pool_size: usize,
    /// Best-effort cache of the last bytecode blob seen per class, used as
    /// `original_bytecode` on the next `HotSwapRequested` — the VM
    /// instrumentation capability exposes handles, not raw bytes (§6).
    last_bytecode: Mutex<HashMap<String, Vec<u8>>>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn EventStore>,
        vm: Arc<dyn VmInstrumentation>,
        registry: Arc<dyn InstanceRegistry>,
        adapters: Vec<Box<dyn FrameworkAdapter>>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
        timeouts: Timeouts,
        access_flag_policy: AccessFlagPolicy,
        pool_size: usize,
    ) -> Self {
        Self {
            store,
            vm,
            registry,
            adapters: Arc::new(adapters),
            clock,
            id_gen,
            timeouts,
            access_flag_policy,
            pool_size,
            last_bytecode: Mutex::new(HashMap::new()),
        }
    }

    /// Start a file-watch session against `config` and drive every change
    /// through the pipeline on a bounded worker pool. Returns a shutdown
    /// handle for the watch session; dropping or signalling it drains the
    /// channel and stops spawning new work.
    pub fn attach(self: &Arc<Self>, config: FileWatchConfig) -> tokio::sync::oneshot::Sender<()> {
        let (event_tx, event_rx) = mpsc::channel(config.raw_channel_capacity);
        let shutdown = filewatch::start(config, event_tx);
        self.clone().spawn_dispatch(event_rx);
        shutdown
    }

    fn spawn_dispatch(self: Arc<Self>, mut event_rx: mpsc::Receiver<FileWatchEvent>) {
        let semaphore = Arc::new(Semaphore::new(self.pool_size.max(1)));
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let engine = self.clone();
                let permit = semaphore.clone().acquire_owned().await;
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = engine.handle_file_watch_event(event).await {
                        error!(error = %e, "pipeline stage failed");
                    }
                });
            }
        });
    }

    async fn handle_file_watch_event(&self, event: FileWatchEvent) -> Result<(), EngineError> {
        let correlation_id = CorrelationId::new(self.id_gen.next());
        match event {
            FileWatchEvent::Changed {
                class_file,
                class_name,
                file_size,
                detected_at,
            } => {
                let changed = self.append_hotswap_event(
                    &class_name,
                    correlation_id.clone(),
                    None,
                    EventPayload::ClassFileChanged {
                        class_file: class_file.clone(),
                        class_name: class_name.clone(),
                        file_size,
                        detected_at,
                    },
                )?;
                self.run_pipeline(&class_name, &class_file, correlation_id, changed).await
            }
            FileWatchEvent::Created {
                class_file,
                class_name,
                file_size,
                detected_at,
            } => {
                let created = self.append_hotswap_event(
                    &class_name,
                    correlation_id.clone(),
                    None,
                    EventPayload::ClassFileCreated {
                        class_file: class_file.clone(),
                        class_name: class_name.clone(),
                        file_size,
                        detected_at,
                    },
                )?;
                self.run_pipeline(&class_name, &class_file, correlation_id, created).await
            }
            FileWatchEvent::Deleted {
                class_file,
                class_name,
                file_size,
                detected_at,
            } => {
                self.append_hotswap_event(
                    &class_name,
                    correlation_id,
                    None,
                    EventPayload::ClassFileDeleted {
                        class_file,
                        class_name: class_name.clone(),
                        file_size,
                        detected_at,
                    },
                )?;
                self.last_bytecode.lock().remove(class_name.as_str());
                Ok(())
            }
            FileWatchEvent::QueueOverflow {
                class_file,
                dropped_event_summary,
            } => {
                warn!(path = %class_file.display(), %dropped_event_summary, "file-watch queue overflow");
                self.append_file_watch_event(
                    &class_file,
                    correlation_id,
                    EventPayload::WatchQueueOverflow {
                        class_file,
                        dropped_event_summary,
                    },
                )?;
                Ok(())
            }
            FileWatchEvent::Stopped { path, reason } => {
                warn!(path = %path.display(), %reason, "file-watch session stopped");
                self.append_file_watch_event(
                    &path,
                    correlation_id,
                    EventPayload::FileWatchStopped { path: path.clone(), reason },
                )?;
                Ok(())
            }
        }
    }

    /// Stages 2-4 of the pipeline: extract metadata, validate, request and
    /// perform the redefinition. Stops after the first stage that doesn't
    /// produce a continuation (rejection or read failure).
    async fn run_pipeline(
        &self,
        class_name: &ClassName,
        class_file: &std::path::Path,
        correlation_id: CorrelationId,
        changed: Event,
    ) -> Result<(), EngineError> {
        let new_bytecode = match std::fs::read(class_file) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(class = %class_name, error = %e, "could not read changed class file");
                return Ok(());
            }
        };

        let metadata = match metadata::extract(class_name.as_str(), &new_bytecode) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.append_hotswap_event(
                    class_name,
                    correlation_id,
                    Some(changed.event_id().clone()),
                    EventPayload::BytecodeRejected {
                        class_file: class_file.to_path_buf(),
                        class_name: class_name.clone(),
                        reason: e.to_string(),
                        rejected_changes: vec![bh_core::RejectedChange::new(
                            bh_core::RejectedChangeKind::Malformed,
                            class_name.as_str(),
                            e.to_string(),
                        )],
                        recovery_action: "Fix the class file and retry".to_string(),
                    },
                )?;
                return Ok(());
            }
        };

        let extracted = self.append_hotswap_event(
            class_name,
            correlation_id.clone(),
            Some(changed.event_id().clone()),
            EventPayload::ClassMetadataExtracted {
                class_file: class_file.to_path_buf(),
                class_name: class_name.clone(),
                super_class: metadata.super_class.clone(),
                interfaces: metadata.interfaces.iter().cloned().collect(),
                fields: metadata.fields.iter().cloned().collect(),
                methods: metadata.methods.iter().cloned().collect(),
            },
        )?;

        let baseline = self.last_validated_metadata(class_name)?;
        let outcome = match &baseline {
            Some(old) => validator::validate(old, &metadata, self.access_flag_policy),
            None => ValidationOutcome::Valid,
        };

        let validated = match outcome {
            ValidationOutcome::Valid => self.append_hotswap_event(
                class_name,
                correlation_id.clone(),
                Some(extracted.event_id().clone()),
                EventPayload::BytecodeValidated {
                    class_file: class_file.to_path_buf(),
                    class_name: class_name.clone(),
                    metadata: metadata.clone(),
                },
            )?,
            ValidationOutcome::Rejected {
                reason,
                rejected_changes,
                recovery_action,
            } => {
                self.append_hotswap_event(
                    class_name,
                    correlation_id,
                    Some(extracted.event_id().clone()),
                    EventPayload::BytecodeRejected {
                        class_file: class_file.to_path_buf(),
                        class_name: class_name.clone(),
                        reason,
                        rejected_changes,
                        recovery_action,
                    },
                )?;
                return Ok(());
            }
        };

        let original_bytecode = self
            .last_bytecode
            .lock()
            .insert(class_name.as_str().to_string(), new_bytecode.clone())
            .unwrap_or_default();

        let request = coordinator::request_hotswap(
            self.store.as_ref(),
            self.clock.as_ref(),
            self.id_gen.as_ref(),
            class_file.to_path_buf(),
            class_name,
            original_bytecode,
            new_bytecode,
            "class file changed",
            correlation_id,
            Some(validated.event_id().clone()),
        )
        .map_err(EngineError::Redefinition)?;

        let RedefinitionOutcome { event, .. } = coordinator::perform_redefinition(
            self.store.as_ref(),
            self.vm.as_ref(),
            self.registry.as_ref(),
            self.adapters.as_slice(),
            self.clock.as_ref(),
            self.id_gen.as_ref(),
            self.timeouts,
            &request,
        )
        .await
        .map_err(EngineError::Redefinition)?;

        if let EventPayload::ClassRedefinitionSucceeded { affected_instances, .. } = &event.payload {
            info!(class = %class_name, instances = affected_instances, "hot-swap pipeline completed");
        }

        Ok(())
    }

    /// The most recent `BytecodeValidated` payload's metadata for `class`,
    /// used as the structural baseline for the next validation — the event
    /// log is this engine's only record of "what's currently installed".
    fn last_validated_metadata(&self, class_name: &ClassName) -> Result<Option<bh_core::ClassMetadata>, EngineError> {
        let events = self
            .store
            .events_for("hotswap", class_name.as_str())
            .map_err(EngineError::Store)?;
        Ok(events.into_iter().rev().find_map(|e| match e.payload {
            EventPayload::BytecodeValidated { metadata, .. } => Some(metadata),
            _ => None,
        }))
    }

    fn append_hotswap_event(
        &self,
        class_name: &ClassName,
        correlation_id: CorrelationId,
        causation_id: Option<bh_core::EventId>,
        payload: EventPayload,
    ) -> Result<Event, EngineError> {
        let previous = self
            .store
            .events_for("hotswap", class_name.as_str())
            .map_err(EngineError::Store)?;
        let factory = EventFactory::new(self.clock.as_ref(), self.id_gen.as_ref());
        let event = factory.build(
            AggregateType::hot_swap(class_name.clone()),
            previous.last(),
            correlation_id,
            causation_id,
            None,
            payload,
        );
        self.store.save(event).map_err(EngineError::Store)
    }

    fn append_file_watch_event(
        &self,
        path: &std::path::Path,
        correlation_id: CorrelationId,
        payload: EventPayload,
    ) -> Result<Event, EngineError> {
        let previous = self
            .store
            .events_for("filewatch", &path.display().to_string())
            .map_err(EngineError::Store)?;
        let factory = EventFactory::new(self.clock.as_ref(), self.id_gen.as_ref());
        let event = factory.build(
            AggregateType::file_watch(PathBuf::from(path)),
            previous.last(),
            correlation_id,
            None,
            None,
            payload,
        );
        self.store.save(event).map_err(EngineError::Store)
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
