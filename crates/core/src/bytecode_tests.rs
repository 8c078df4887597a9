// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn field_member_formats_name_and_descriptor() {
    let field = FieldDescriptor::new("count", "I");
    assert_eq!(field.member(), "field count:I");
}

#[test]
fn method_member_formats_name_and_descriptor() {
    let method = MethodDescriptor::new("run", "()V");
    assert_eq!(method.member(), "method run()V");
}

#[test]
fn method_with_flags_stores_sorted_unique_set() {
    let method = MethodDescriptor::new("run", "()V")
        .with_flags([AccessFlag::Public, AccessFlag::Static, AccessFlag::Public]);
    assert_eq!(method.access_flags.len(), 2);
    assert!(method.access_flags.contains(&AccessFlag::Static));
}

#[test]
fn rejected_change_round_trips_through_json() {
    let change = RejectedChange::new(RejectedChangeKind::Added, "field x:int", "new field added");
    let json = serde_json::to_string(&change).unwrap();
    let back: RejectedChange = serde_json::from_str(&json).unwrap();
    assert_eq!(change, back);
}
