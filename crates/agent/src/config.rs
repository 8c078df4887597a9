// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration (§6 "Configuration (enumerated)"): loaded once from
//! TOML on attach, then read-only for the engine's lifetime. Unknown keys
//! are errors, not warnings.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub watch: WatchConfig,
    #[serde(default)]
    pub swap: SwapConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapConfig {
    #[serde(default = "default_redefinition_timeout_ms")]
    pub redefinition_timeout_ms: u64,
    #[serde(default = "default_reconciliation_timeout_ms")]
    pub reconciliation_timeout_ms: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            redefinition_timeout_ms: default_redefinition_timeout_ms(),
            reconciliation_timeout_ms: default_reconciliation_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub retention_events: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence_default: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_confidence_default: default_min_confidence(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    #[serde(default = "default_max_captured_events")]
    pub max_captured_events: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_captured_events: default_max_captured_events(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.class".to_string()]
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_redefinition_timeout_ms() -> u64 {
    5_000
}
fn default_reconciliation_timeout_ms() -> u64 {
    10_000
}
fn default_pool_size() -> usize {
    4
}
fn default_min_confidence() -> f64 {
    0.7
}
fn default_max_captured_events() -> usize {
    100
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
