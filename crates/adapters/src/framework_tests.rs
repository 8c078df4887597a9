// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeFrameworkAdapter;
use super::*;
use bh_core::ClassName;

#[tokio::test]
async fn noop_adapter_never_detects_anything() {
    let adapter = NoOpFrameworkAdapter;
    assert!(!adapter.detect(&ClassName::new("com.ex.A")).await);
}

#[tokio::test]
async fn refresh_all_skips_adapters_that_do_not_detect_the_class() {
    let adapter = FakeFrameworkAdapter::new("spring-like");
    adapter.manage("com.ex.Other");
    let adapters: Vec<Box<dyn FrameworkAdapter>> = vec![Box::new(adapter.clone())];

    let errors = refresh_all(
        &adapters,
        &ClassName::new("com.ex.A"),
        &[InstanceHandle("i1".into())],
    )
    .await;

    assert!(errors.is_empty());
    assert!(adapter.refreshed().is_empty());
}

#[tokio::test]
async fn refresh_all_refreshes_every_instance_for_a_managed_class() {
    let adapter = FakeFrameworkAdapter::new("spring-like");
    adapter.manage("com.ex.A");
    let adapters: Vec<Box<dyn FrameworkAdapter>> = vec![Box::new(adapter.clone())];

    let errors = refresh_all(
        &adapters,
        &ClassName::new("com.ex.A"),
        &[InstanceHandle("i1".into()), InstanceHandle("i2".into())],
    )
    .await;

    assert!(errors.is_empty());
    assert_eq!(adapter.refreshed().len(), 2);
    assert_eq!(adapter.redefined_notifications(), vec!["com.ex.A".to_string()]);
}

#[tokio::test]
async fn one_adapter_failure_does_not_stop_the_others() {
    let failing = FakeFrameworkAdapter::new("failing");
    failing.manage("com.ex.A");
    failing.fail_refresh_for("com.ex.A");

    let healthy = FakeFrameworkAdapter::new("healthy");
    healthy.manage("com.ex.A");

    let adapters: Vec<Box<dyn FrameworkAdapter>> =
        vec![Box::new(failing.clone()), Box::new(healthy.clone())];

    let errors = refresh_all(
        &adapters,
        &ClassName::new("com.ex.A"),
        &[InstanceHandle("i1".into())],
    )
    .await;

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].adapter_name, "failing");
    assert_eq!(healthy.refreshed().len(), 1);
}
