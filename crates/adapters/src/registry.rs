// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance registry capability (§4.5, §9): resolves the "how does the
//! reconciler enumerate affected instances" Open Question by enumerating via
//! the VM's live-instance traversal rather than parsing bytecode content.
//! Kept separate from `VmInstrumentation` because not every host exposes
//! instance enumeration through the same primitive as redefinition.

use crate::vm::InstanceHandle;
use async_trait::async_trait;

#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// Live instances of `fqn` known to the registry at call time. Best
    /// effort: a registry backed by weak references may omit collected
    /// instances without that being an error.
    async fn instances_of(&self, fqn: &str) -> Vec<InstanceHandle>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeInstanceRegistry {
        inner: Arc<Mutex<HashMap<String, Vec<InstanceHandle>>>>,
    }

    impl FakeInstanceRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn register(&self, fqn: &str, instances: Vec<InstanceHandle>) {
            self.inner.lock().insert(fqn.to_string(), instances);
        }
    }

    #[async_trait]
    impl InstanceRegistry for FakeInstanceRegistry {
        async fn instances_of(&self, fqn: &str) -> Vec<InstanceHandle> {
            self.inner.lock().get(fqn).cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
