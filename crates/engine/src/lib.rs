// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bh-engine: the hot-swap pipeline — validator, coordinator, reconciler,
//! rollback engine, flow detector, and the reactive wiring that drives them
//! off the file-watch session (§4, §5).

pub mod coordinator;
pub mod error;
pub mod error_snapshot;
pub mod flow_detector;
pub mod metadata;
pub mod reconciler;
pub mod rollback;
pub mod runtime;
pub mod validator;

pub use coordinator::{
    capture_snapshot, perform_redefinition, request_hotswap, RedefinitionOutcome, Timeouts,
};
pub use error::{EngineError, ReconciliationError, RedefinitionError, RollbackError, ValidationError};
pub use error_snapshot::{capture as capture_error_snapshot, WrappedError};
pub use flow_detector::{detect_all, evaluate, FlowMatch};
pub use reconciler::{reconcile, ReconciliationOutcome};
pub use rollback::{apply_plan, apply_single, perform_rollback, topological_order, RollbackAuditTrail};
pub use runtime::Engine;
pub use validator::{validate, AccessFlagPolicy, ValidationOutcome};
