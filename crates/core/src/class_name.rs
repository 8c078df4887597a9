// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fully-qualified class name, and the aggregate identities derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A dotted, fully-qualified class name (e.g. `com.ex.A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(fqn: impl Into<String>) -> Self {
        Self(fqn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The aggregate id this class's events are filed under. Bare (not
    /// type-prefixed): uniqueness across aggregate types comes from pairing
    /// this with `AggregateType::type_name` in the store's key, not from the
    /// id string alone.
    pub fn aggregate_id(&self) -> String {
        self.0.clone()
    }

    /// Derive a class name from a `.class` file path relative to a watch
    /// root: the package path (directory components) plus the file stem,
    /// dot-joined.
    pub fn from_class_file(root: &Path, file: &Path) -> Option<Self> {
        let relative = file.strip_prefix(root).ok()?;
        let stem = relative.file_stem()?.to_str()?;
        let mut parts: Vec<&str> = relative
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        parts.push(stem);
        Some(Self(parts.join(".")))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClassName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClassName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The aggregate identity a watched file's events are filed under.
pub fn filewatch_aggregate_id(path: &Path) -> String {
    path.display().to_string()
}

/// The aggregate identity a flow detector's runs are filed under.
pub fn flow_aggregate_id(detector_id: &str) -> String {
    detector_id.to_string()
}

#[cfg(test)]
#[path = "class_name_tests.rs"]
mod tests;
