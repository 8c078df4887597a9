// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders shared across crates. Enabled by the `test-support`
//! feature (mirrors the teacher's gating of fakes/builders).

use crate::aggregate::AggregateType;
use crate::class_name::ClassName;
use crate::clock::FakeClock;
use crate::event::{Event, EventFactory, EventPayload};
use crate::id::{CorrelationId, SequentialIdGen};
use chrono::{TimeZone, Utc};

/// Convenience wrapper around [`EventFactory`] with a deterministic clock and
/// id generator, so tests can build chained events without repeating the
/// aggregate/version bookkeeping.
pub struct TestEventFactory {
    clock: FakeClock,
    id_gen: SequentialIdGen,
    correlation_id: CorrelationId,
}

impl Default for TestEventFactory {
    fn default() -> Self {
        Self {
            clock: FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            id_gen: SequentialIdGen::new("evt"),
            correlation_id: CorrelationId::new("test-correlation"),
        }
    }
}

impl TestEventFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    pub fn advance(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }

    /// Build the next event for `class_name`'s `hotswap:<fqn>` aggregate.
    pub fn next_hotswap_event(&self, class_name: &ClassName, previous: Option<&Event>, payload: EventPayload) -> Event {
        let factory = EventFactory::new(&self.clock, &self.id_gen);
        factory.build(
            AggregateType::hot_swap(class_name.clone()),
            previous,
            self.correlation_id.clone(),
            previous.map(|e| e.event_id().clone()),
            None,
            payload,
        )
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
