// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate identity: the type+id pair events are filed and versioned under.

use crate::class_name::{filewatch_aggregate_id, flow_aggregate_id, ClassName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The three aggregate types the core pipeline writes events under (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateType {
    FileWatch { path: PathBuf },
    HotSwap { class_name: ClassName },
    Flow { detector_id: String },
}

impl AggregateType {
    pub fn file_watch(path: impl Into<PathBuf>) -> Self {
        Self::FileWatch { path: path.into() }
    }

    pub fn hot_swap(class_name: ClassName) -> Self {
        Self::HotSwap { class_name }
    }

    pub fn flow(detector_id: impl Into<String>) -> Self {
        Self::Flow {
            detector_id: detector_id.into(),
        }
    }

    /// The bare aggregate id (e.g. `com.ex.A`) used together with
    /// `type_name` as the event store's aggregate key. Two different
    /// aggregate types may produce the same bare id; the store's key pairs
    /// it with `type_name` to keep them apart.
    pub fn aggregate_id(&self) -> String {
        match self {
            AggregateType::FileWatch { path } => filewatch_aggregate_id(path),
            AggregateType::HotSwap { class_name } => class_name.aggregate_id(),
            AggregateType::Flow { detector_id } => flow_aggregate_id(detector_id),
        }
    }

    /// The bare type discriminant (`"filewatch"`, `"hotswap"`, `"flow"`),
    /// used by `events_by_type`/`aggregate_types`-style queries.
    pub fn type_name(&self) -> &'static str {
        match self {
            AggregateType::FileWatch { .. } => "filewatch",
            AggregateType::HotSwap { .. } => "hotswap",
            AggregateType::Flow { .. } => "flow",
        }
    }

    pub fn file_watch_path(path: &Path) -> Self {
        Self::file_watch(path.to_path_buf())
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
