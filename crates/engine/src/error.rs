// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§7): one enum per pipeline stage, aggregated into
//! `EngineError` for callers that don't care which stage failed.

use bh_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed class file: {0}")]
    BytecodeMalformed(String),
    #[error("hierarchy change: {0}")]
    HierarchyChange(String),
    #[error("interface change: {0}")]
    InterfaceChange(String),
    #[error("field change: {0}")]
    FieldChange(String),
    #[error("method change: {0}")]
    MethodChange(String),
    #[error("access-flag change: {0}")]
    AccessChange(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedefinitionError {
    #[error("class not loaded: {0}")]
    ClassNotLoaded(String),
    #[error("schema change rejected: {0}")]
    SchemaChange(String),
    #[error("unsupported change: {0}")]
    UnsupportedChange(String),
    #[error("VM rejected redefinition: {0}")]
    VmRejected(String),
    #[error("engine error: {0}")]
    EngineError(String),
}

impl RedefinitionError {
    pub fn kind(&self) -> &'static str {
        match self {
            RedefinitionError::ClassNotLoaded(_) => "class_not_loaded",
            RedefinitionError::SchemaChange(_) => "schema_change",
            RedefinitionError::UnsupportedChange(_) => "unsupported_change",
            RedefinitionError::VmRejected(_) => "vm_rejected",
            RedefinitionError::EngineError(_) => "engine_error",
        }
    }

    /// One-line recovery hint (§4.4 failure classification table).
    pub fn recovery_action(&self) -> &'static str {
        match self {
            RedefinitionError::SchemaChange(_) => "Restart to load new definition",
            RedefinitionError::UnsupportedChange(_) => "Use a compatible change or restart",
            RedefinitionError::ClassNotLoaded(_) => "Load or instantiate the class first",
            RedefinitionError::VmRejected(_) => "Check compatibility; retry",
            RedefinitionError::EngineError(_) => "Inspect logs; retry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    #[error("partial reconciliation: {0}")]
    PartialReconciliation(String),
    #[error("framework refresh failed: {0}")]
    FrameworkRefreshFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollbackError {
    #[error("snapshot corrupt: {0}")]
    SnapshotCorrupt(String),
    #[error("rollback aborted: {0}")]
    RollbackAborted(String),
}

/// Aggregated error surface for callers that drive the pipeline end-to-end
/// rather than a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Redefinition(#[from] RedefinitionError),
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
    #[error(transparent)]
    Rollback(#[from] RollbackError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
