// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow pattern definitions matched by the flow detector (§4.8).

use std::time::Duration;

/// A named, ordered event-type pattern with a time window and a base
/// confidence score.
#[derive(Clone)]
pub struct Flow {
    pub flow_id: String,
    pub name: String,
    /// Event-type names, in the order they must appear (possibly interleaved
    /// with unrelated events of other aggregates).
    pub event_sequence: Vec<&'static str>,
    pub minimum_event_count: usize,
    pub maximum_time_window: Duration,
    pub base_confidence: f64,
    /// Optional condition evaluated by the caller; when absent it never
    /// penalizes the confidence score.
    pub optional_predicate: Option<fn(&[crate::event::Event]) -> bool>,
}

impl Flow {
    /// *Hot-swap complete*: full pipeline within 30s, min 4 events, 0.95.
    pub fn hot_swap_complete() -> Self {
        Self {
            flow_id: "hot-swap-complete".into(),
            name: "Hot-Swap Complete Flow".into(),
            event_sequence: vec![
                "class_file_changed",
                "class_metadata_extracted",
                "bytecode_validated",
                "hot_swap_requested",
                "class_redefinition_succeeded",
                "instances_updated",
            ],
            minimum_event_count: 4,
            maximum_time_window: Duration::from_secs(30),
            base_confidence: 0.95,
            optional_predicate: None,
        }
    }

    /// *Error-recovery*: a redefinition failure within 2 minutes.
    pub fn error_recovery() -> Self {
        Self {
            flow_id: "error-recovery".into(),
            name: "Error Recovery Flow".into(),
            event_sequence: vec!["class_redefinition_failed"],
            minimum_event_count: 1,
            maximum_time_window: Duration::from_secs(120),
            base_confidence: 0.85,
            optional_predicate: None,
        }
    }

    /// *Iterative-development*: alternating modify/validate clusters within
    /// 5 minutes.
    pub fn iterative_development() -> Self {
        Self {
            flow_id: "iterative-development".into(),
            name: "Iterative Development Flow".into(),
            event_sequence: vec![
                "class_file_changed",
                "bytecode_validated",
                "class_file_changed",
                "bytecode_validated",
            ],
            minimum_event_count: 4,
            maximum_time_window: Duration::from_secs(300),
            base_confidence: 0.7,
            optional_predicate: None,
        }
    }

    pub fn built_ins() -> Vec<Flow> {
        vec![
            Self::hot_swap_complete(),
            Self::error_recovery(),
            Self::iterative_development(),
        ]
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
