// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The VM instrumentation capability (§6): the abstract boundary between the
//! engine and the host VM's class-redefinition primitives.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Opaque handle to a loaded class, as returned by `find_loaded_class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassHandle(pub String);

/// Opaque handle to a live instance, as returned by instance enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub String);

/// Category of VM rejection, matched against the coordinator's failure
/// classification table (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmErrorCategory {
    SchemaChange,
    UnsupportedChange,
    ClassNotLoaded,
    Other,
}

#[derive(Debug, Clone, Error)]
#[error("{category:?}: {message}")]
pub struct VmError {
    pub category: VmErrorCategory,
    pub message: String,
}

impl VmError {
    pub fn new(category: VmErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract capability exposing the host VM's redefinition primitives (§6).
/// The engine refuses to start if `is_redefinition_supported()` is false.
#[async_trait]
pub trait VmInstrumentation: Send + Sync {
    async fn find_loaded_class(&self, fqn: &str) -> Option<ClassHandle>;

    async fn redefine_class(
        &self,
        handle: &ClassHandle,
        new_bytes: &[u8],
    ) -> Result<(), VmError>;

    fn is_retransformation_supported(&self) -> bool;

    fn is_redefinition_supported(&self) -> bool;

    async fn all_loaded_classes(&self) -> Vec<ClassHandle>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Scripted `VmInstrumentation` for tests: classes are pre-registered,
    /// and `redefine_class` can be told to fail for a given class, with a
    /// specific category/message.
    #[derive(Clone, Default)]
    pub struct FakeVm {
        inner: Arc<Mutex<FakeVmState>>,
    }

    #[derive(Default)]
    struct FakeVmState {
        loaded: HashMap<String, ClassHandle>,
        scripted_failures: HashMap<String, VmError>,
        redefinitions: Vec<(String, Vec<u8>)>,
        retransformation_supported: bool,
        redefinition_supported: bool,
    }

    impl FakeVm {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeVmState {
                    retransformation_supported: true,
                    redefinition_supported: true,
                    ..Default::default()
                })),
            }
        }

        pub fn load_class(&self, fqn: &str) {
            let mut state = self.inner.lock();
            state
                .loaded
                .insert(fqn.to_string(), ClassHandle(fqn.to_string()));
        }

        pub fn fail_next_redefinition(&self, fqn: &str, error: VmError) {
            self.inner
                .lock()
                .scripted_failures
                .insert(fqn.to_string(), error);
        }

        pub fn set_redefinition_supported(&self, supported: bool) {
            self.inner.lock().redefinition_supported = supported;
        }

        pub fn redefinitions(&self) -> Vec<(String, Vec<u8>)> {
            self.inner.lock().redefinitions.clone()
        }
    }

    #[async_trait]
    impl VmInstrumentation for FakeVm {
        async fn find_loaded_class(&self, fqn: &str) -> Option<ClassHandle> {
            self.inner.lock().loaded.get(fqn).cloned()
        }

        async fn redefine_class(
            &self,
            handle: &ClassHandle,
            new_bytes: &[u8],
        ) -> Result<(), VmError> {
            let mut state = self.inner.lock();
            if let Some(error) = state.scripted_failures.remove(&handle.0) {
                return Err(error);
            }
            state
                .redefinitions
                .push((handle.0.clone(), new_bytes.to_vec()));
            Ok(())
        }

        fn is_retransformation_supported(&self) -> bool {
            self.inner.lock().retransformation_supported
        }

        fn is_redefinition_supported(&self) -> bool {
            self.inner.lock().redefinition_supported
        }

        async fn all_loaded_classes(&self) -> Vec<ClassHandle> {
            self.inner.lock().loaded.values().cloned().collect()
        }
    }
}

#[cfg(test)]
#[path = "vm_tests.rs"]
mod tests;
