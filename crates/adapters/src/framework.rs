// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framework adapter capability (§4.5, §6): optional, polymorphic hooks that
//! let framework-managed instances (DI containers, ORM proxies, ...)
//! participate in reconciliation after a successful redefinition.
//!
//! Zero or more adapters may be installed; the reconciler invokes them in
//! registration order and isolates failures per adapter (§9: framework
//! adapters complete before `InstancesUpdated` is emitted, but their
//! ordering relative to each other is registration order, not priority).

use crate::vm::InstanceHandle;
use async_trait::async_trait;
use bh_core::ClassName;
use std::fmt;

#[derive(Debug, Clone)]
pub struct FrameworkRefreshError {
    pub adapter_name: String,
    pub message: String,
}

impl fmt::Display for FrameworkRefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.adapter_name, self.message)
    }
}

#[async_trait]
pub trait FrameworkAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this adapter manages anything for `class_name`. A `false`
    /// means `refresh`/`on_redefined` are skipped for that class entirely.
    async fn detect(&self, class_name: &ClassName) -> bool;

    async fn refresh(
        &self,
        class_name: &ClassName,
        instance: &InstanceHandle,
    ) -> Result<(), FrameworkRefreshError>;

    async fn on_redefined(&self, class_name: &ClassName) -> Result<(), FrameworkRefreshError>;
}

/// Always declines `detect`, so it never participates. Used when no
/// framework integration is configured but the reconciler still wants a
/// uniform adapter list to iterate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpFrameworkAdapter;

#[async_trait]
impl FrameworkAdapter for NoOpFrameworkAdapter {
    fn name(&self) -> &str {
        "noop"
    }

    async fn detect(&self, _class_name: &ClassName) -> bool {
        false
    }

    async fn refresh(
        &self,
        _class_name: &ClassName,
        _instance: &InstanceHandle,
    ) -> Result<(), FrameworkRefreshError> {
        Ok(())
    }

    async fn on_redefined(&self, _class_name: &ClassName) -> Result<(), FrameworkRefreshError> {
        Ok(())
    }
}

/// Run every adapter's `detect`/`refresh`/`on_redefined` in registration
/// order for one class, collecting per-adapter failures instead of
/// short-circuiting (§4.5: reconciliation is "partial" on adapter errors,
/// not aborted).
pub async fn refresh_all(
    adapters: &[Box<dyn FrameworkAdapter>],
    class_name: &ClassName,
    instances: &[InstanceHandle],
) -> Vec<FrameworkRefreshError> {
    let mut errors = Vec::new();
    for adapter in adapters {
        if !adapter.detect(class_name).await {
            continue;
        }
        for instance in instances {
            if let Err(e) = adapter.refresh(class_name, instance).await {
                errors.push(e);
            }
        }
        if let Err(e) = adapter.on_redefined(class_name).await {
            errors.push(e);
        }
    }
    errors
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeFrameworkAdapter {
        name: String,
        inner: Arc<Mutex<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        managed_classes: Vec<String>,
        fail_refresh_for: Option<String>,
        refreshed: Vec<(String, String)>,
        redefined_notifications: Vec<String>,
    }

    impl FakeFrameworkAdapter {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                inner: Arc::new(Mutex::new(FakeState::default())),
            }
        }

        pub fn manage(&self, class_name: &str) {
            self.inner.lock().managed_classes.push(class_name.to_string());
        }

        pub fn fail_refresh_for(&self, class_name: &str) {
            self.inner.lock().fail_refresh_for = Some(class_name.to_string());
        }

        pub fn refreshed(&self) -> Vec<(String, String)> {
            self.inner.lock().refreshed.clone()
        }

        pub fn redefined_notifications(&self) -> Vec<String> {
            self.inner.lock().redefined_notifications.clone()
        }
    }

    #[async_trait]
    impl FrameworkAdapter for FakeFrameworkAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn detect(&self, class_name: &ClassName) -> bool {
            self.inner
                .lock()
                .managed_classes
                .iter()
                .any(|c| c == class_name.as_str())
        }

        async fn refresh(
            &self,
            class_name: &ClassName,
            instance: &InstanceHandle,
        ) -> Result<(), FrameworkRefreshError> {
            let mut state = self.inner.lock();
            if state.fail_refresh_for.as_deref() == Some(class_name.as_str()) {
                return Err(FrameworkRefreshError {
                    adapter_name: self.name.clone(),
                    message: "scripted failure".to_string(),
                });
            }
            state
                .refreshed
                .push((class_name.as_str().to_string(), instance.0.clone()));
            Ok(())
        }

        async fn on_redefined(&self, class_name: &ClassName) -> Result<(), FrameworkRefreshError> {
            self.inner
                .lock()
                .redefined_notifications
                .push(class_name.as_str().to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "framework_tests.rs"]
mod tests;
