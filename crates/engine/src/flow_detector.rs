// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow detector (§4.8): matches recent event-type sequences against known
//! `Flow` patterns and scores a confidence for each match.

use bh_core::{Clock, Event, EventId, Flow};
use chrono::{DateTime, Utc};

/// A recognized occurrence of a `Flow` pattern in the event stream.
#[derive(Debug, Clone)]
pub struct FlowMatch {
    pub flow_id: String,
    pub flow_name: String,
    pub triggering_events: Vec<EventId>,
    pub confidence: f64,
    pub discovered_at: DateTime<Utc>,
}

/// Find the earliest subsequence of `events` (assumed ordered by timestamp)
/// whose type names match `sequence` in order; unrelated events of other
/// aggregates may appear between matches (§4.8, "matching... by event-type
/// name only").
fn match_sequence<'a>(events: &'a [Event], sequence: &[&str]) -> Vec<&'a Event> {
    let mut matched = Vec::with_capacity(sequence.len());
    let mut cursor = 0;
    for wanted in sequence {
        while cursor < events.len() {
            let event = &events[cursor];
            cursor += 1;
            if event.type_name() == *wanted {
                matched.push(event);
                break;
            }
        }
    }
    matched
}

/// Evaluate `flow` against `events`, returning a match only when the
/// observed run clears `minimum_event_count` and the computed confidence
/// meets `min_confidence` (§4.8 confidence formula).
pub fn evaluate(flow: &Flow, events: &[Event], min_confidence: f64, clock: &dyn Clock) -> Option<FlowMatch> {
    let matched = match_sequence(events, &flow.event_sequence);
    if matched.len() < flow.minimum_event_count {
        return None;
    }

    let observed_ratio = (matched.len() as f64 / flow.event_sequence.len() as f64).min(1.0);

    let first = matched.first()?.header.timestamp;
    let last = matched.last()?.header.timestamp;
    let actual_duration = (last - first).to_std().unwrap_or(std::time::Duration::ZERO);
    let time_penalty = if actual_duration > flow.maximum_time_window {
        let expected = flow.maximum_time_window.as_secs_f64();
        let actual = actual_duration.as_secs_f64();
        (expected / actual).max(0.5)
    } else {
        1.0
    };

    let condition_penalty = match flow.optional_predicate {
        Some(predicate) => {
            let owned: Vec<Event> = matched.iter().map(|e| (*e).clone()).collect();
            if predicate(&owned) {
                1.0
            } else {
                0.5
            }
        }
        None => 1.0,
    };

    let confidence = (flow.base_confidence * observed_ratio * time_penalty * condition_penalty).clamp(0.0, 1.0);
    if confidence < min_confidence {
        return None;
    }

    Some(FlowMatch {
        flow_id: flow.flow_id.clone(),
        flow_name: flow.name.clone(),
        triggering_events: matched.iter().map(|e| e.event_id().clone()).collect(),
        confidence,
        discovered_at: clock.now(),
    })
}

/// Evaluate every flow in `flows` against `events`, returning all matches
/// that clear `min_confidence`.
pub fn detect_all(flows: &[Flow], events: &[Event], min_confidence: f64, clock: &dyn Clock) -> Vec<FlowMatch> {
    flows.iter().filter_map(|flow| evaluate(flow, events, min_confidence, clock)).collect()
}

#[cfg(test)]
#[path = "flow_detector_tests.rs"]
mod tests;
