// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance reconciler (§4.5): after a successful redefinition, enumerates
//! live instances and brings their state in line with the new class shape.
//!
//! Because the validator (§4.3) never allows a field-set change, there is no
//! field data to rewrite; reconciliation is cache invalidation plus, for
//! framework-managed instances, an adapter-driven refresh (§9: adapters run
//! before `InstancesUpdated`, never after).

use bh_adapters::{FrameworkAdapter, InstanceRegistry};
use bh_core::{ClassName, InstanceReconciliationError, ReconciliationStrategy};

pub struct ReconciliationOutcome {
    pub updated_instance_count: u64,
    pub strategy: ReconciliationStrategy,
    pub partial: bool,
    pub errors: Vec<InstanceReconciliationError>,
}

pub async fn reconcile(
    class_name: &ClassName,
    registry: &dyn InstanceRegistry,
    adapters: &[Box<dyn FrameworkAdapter>],
) -> ReconciliationOutcome {
    let instances = registry.instances_of(class_name.as_str()).await;

    let mut framework_managed = false;
    let mut errors = Vec::new();
    for adapter in adapters {
        if !adapter.detect(class_name).await {
            continue;
        }
        framework_managed = true;
        for instance in &instances {
            if let Err(e) = adapter.refresh(class_name, instance).await {
                errors.push(InstanceReconciliationError {
                    instance_ref: instance.0.clone(),
                    message: e.to_string(),
                });
            }
        }
        if let Err(e) = adapter.on_redefined(class_name).await {
            errors.push(InstanceReconciliationError {
                instance_ref: "<class>".to_string(),
                message: e.to_string(),
            });
        }
    }

    ReconciliationOutcome {
        updated_instance_count: instances.len() as u64,
        strategy: if framework_managed {
            ReconciliationStrategy::Full
        } else {
            ReconciliationStrategy::CacheInvalidation
        },
        partial: !errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
