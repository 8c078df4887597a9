// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn version_conflict_message_includes_expected_and_actual() {
    let err = StoreError::VersionConflict {
        aggregate_id: "hotswap:com.ex.A".into(),
        expected: 3,
        actual: 2,
    };
    let message = err.to_string();
    assert!(message.contains("hotswap:com.ex.A"));
    assert!(message.contains('3'));
    assert!(message.contains('2'));
}
