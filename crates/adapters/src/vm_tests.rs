// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeVm;
use super::*;

#[tokio::test]
async fn fake_vm_finds_loaded_classes_after_registration() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");

    let found = vm.find_loaded_class("com.ex.A").await;
    assert_eq!(found, Some(ClassHandle("com.ex.A".into())));
    assert!(vm.find_loaded_class("com.ex.B").await.is_none());
}

#[tokio::test]
async fn redefine_class_records_the_call() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let handle = vm.find_loaded_class("com.ex.A").await.unwrap();

    vm.redefine_class(&handle, &[1, 2, 3]).await.unwrap();

    assert_eq!(vm.redefinitions(), vec![("com.ex.A".to_string(), vec![1, 2, 3])]);
}

#[tokio::test]
async fn scripted_failure_is_returned_once() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    let handle = vm.find_loaded_class("com.ex.A").await.unwrap();
    vm.fail_next_redefinition(
        "com.ex.A",
        VmError::new(VmErrorCategory::SchemaChange, "field layout changed"),
    );

    let err = vm.redefine_class(&handle, &[1]).await.unwrap_err();
    assert_eq!(err.category, VmErrorCategory::SchemaChange);

    // second attempt is not scripted, so it succeeds.
    vm.redefine_class(&handle, &[1]).await.unwrap();
}

#[tokio::test]
async fn all_loaded_classes_reflects_registrations() {
    let vm = FakeVm::new();
    vm.load_class("com.ex.A");
    vm.load_class("com.ex.B");

    let classes = vm.all_loaded_classes().await;
    assert_eq!(classes.len(), 2);
}

#[test]
fn redefinition_support_flags_default_to_true() {
    let vm = FakeVm::new();
    assert!(vm.is_redefinition_supported());
    assert!(vm.is_retransformation_supported());

    vm.set_redefinition_supported(false);
    assert!(!vm.is_redefinition_supported());
}
