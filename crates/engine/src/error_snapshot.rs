// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error classification & event snapshot on error (§4.7): wraps a pipeline
//! failure with a reproducible context capturing the last N events of the
//! aggregates involved, plus host metadata, for bug reproduction.

use bh_core::{Clock, ErrorId, EventSnapshot, IdGen, PerformanceMetrics};
use bh_store::EventStore;
use std::collections::HashMap;
use std::time::Instant;

/// A pipeline failure wrapped with a reproducible `EventSnapshot`.
#[derive(Debug, Clone)]
pub struct WrappedError {
    pub error_id: ErrorId,
    pub message: String,
    pub snapshot: EventSnapshot,
}

impl WrappedError {
    /// Given/When/Then reproduction text referencing specific event ids
    /// (§4.7, scenario 6).
    pub fn reproduction_scenario(&self) -> String {
        let last_event = self
            .snapshot
            .captured_events
            .last()
            .map(|e| format!("{} ({})", e.event_id(), e.type_name()))
            .unwrap_or_else(|| "<no prior events>".to_string());

        format!(
            "Given: the event stream ending at {last_event}\n\
             When: the pipeline processes the next step and raises `{}`\n\
             Then: the error is surfaced with error_id {} and message \"{}\"\n",
            self.message, self.error_id, self.message
        )
    }

    /// A bug-report document with the §4.7 mandated section headings.
    pub fn bug_report(&self) -> String {
        let event_context = if self.snapshot.captured_events.is_empty() {
            "(no events captured)".to_string()
        } else {
            self.snapshot
                .captured_events
                .iter()
                .map(|e| format!("- {} {} (v{})", e.event_id(), e.type_name(), e.aggregate_version()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "# Bug Report\n\n\
             ## Error Summary\n\
             error_id: {}\n\
             {}\n\n\
             ## Event Context\n\
             {event_context}\n\n\
             ## System State\n\
             thread: {}\n\
             processor_count: {}\n\
             memory_used_bytes: {}\n\
             memory_total_bytes: {}\n\
             fallback_snapshot: {}\n\n\
             ## Reproduction\n\
             {}\n",
            self.error_id,
            self.message,
            self.snapshot.thread_name,
            self.snapshot.performance_metrics.processor_count,
            self.snapshot.performance_metrics.memory_used_bytes,
            self.snapshot.performance_metrics.memory_total_bytes,
            self.snapshot.is_fallback,
            self.reproduction_scenario(),
        )
    }
}

/// Capture an `EventSnapshot` covering the last `max_captured_events` events
/// across `aggregates`, degrading to a minimal fallback if the store is
/// unavailable. Capture is expected to finish in <100ms in the common case;
/// callers that need the hard budget enforced should race this future
/// against a timeout themselves (§5: "every operation with an external
/// dependency carries a deadline").
pub fn capture(
    store: &dyn EventStore,
    aggregates: &[(String, String)],
    thread_name: impl Into<String>,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    max_captured_events: usize,
) -> EventSnapshot {
    let start = Instant::now();

    if !store.is_healthy() {
        return fallback_snapshot(thread_name, id_gen, clock);
    }

    let mut events = Vec::new();
    for (aggregate_type, aggregate_id) in aggregates {
        if let Ok(found) = store.events_for(aggregate_type, aggregate_id) {
            events.extend(found);
        }
    }
    events.sort_by_key(|e| e.header.timestamp);
    if events.len() > max_captured_events {
        let cut = events.len() - max_captured_events;
        events = events.split_off(cut);
    }

    let causal_chain: Vec<_> = events
        .iter()
        .filter_map(|e| e.header.causation_id.clone())
        .collect();

    EventSnapshot {
        snapshot_id: bh_core::SnapshotId::new(id_gen.next()),
        captured_at: clock.now(),
        captured_events: events,
        thread_name: thread_name.into(),
        environment: std::env::vars().collect(),
        system_properties: system_properties(),
        causal_chain: if causal_chain.is_empty() { None } else { Some(causal_chain) },
        performance_metrics: performance_metrics(start),
        is_fallback: false,
    }
}

fn fallback_snapshot(thread_name: impl Into<String>, id_gen: &dyn IdGen, clock: &dyn Clock) -> EventSnapshot {
    EventSnapshot {
        snapshot_id: bh_core::SnapshotId::new(id_gen.next()),
        captured_at: clock.now(),
        captured_events: Vec::new(),
        thread_name: thread_name.into(),
        environment: HashMap::new(),
        system_properties: HashMap::new(),
        causal_chain: None,
        performance_metrics: PerformanceMetrics {
            memory_total_bytes: 0,
            memory_used_bytes: 0,
            processor_count: available_parallelism(),
            capture_duration_ms: 0,
        },
        is_fallback: true,
    }
}

fn system_properties() -> HashMap<String, String> {
    let mut props = HashMap::new();
    props.insert("os".to_string(), std::env::consts::OS.to_string());
    props.insert("arch".to_string(), std::env::consts::ARCH.to_string());
    props
}

fn performance_metrics(start: Instant) -> PerformanceMetrics {
    let (total, used) = memory_bytes();
    PerformanceMetrics {
        memory_total_bytes: total,
        memory_used_bytes: used,
        processor_count: available_parallelism(),
        capture_duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn available_parallelism() -> u32 {
    std::thread::available_parallelism().map(|n| n.get() as u32).unwrap_or(1)
}

/// Best-effort `(total, used)` memory in bytes, read from `/proc/meminfo` on
/// Linux; `(0, 0)` elsewhere rather than pulling in a whole-system metrics
/// crate for two numbers in a bug report.
fn memory_bytes() -> (u64, u64) {
    #[cfg(target_os = "linux")]
    {
        if let Ok(contents) = std::fs::read_to_string("/proc/meminfo") {
            let mut total_kb = 0u64;
            let mut available_kb = 0u64;
            for line in contents.lines() {
                if let Some(rest) = line.strip_prefix("MemTotal:") {
                    total_kb = parse_kb(rest);
                } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                    available_kb = parse_kb(rest);
                }
            }
            let total = total_kb * 1024;
            let used = total.saturating_sub(available_kb * 1024);
            return (total, used);
        }
    }
    (0, 0)
}

#[cfg(target_os = "linux")]
fn parse_kb(rest: &str) -> u64 {
    rest.split_whitespace().next().and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
#[path = "error_snapshot_tests.rs"]
mod tests;
