// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hotswap_aggregate_id_matches_class_fqn() {
    let agg = AggregateType::hot_swap(ClassName::new("com.ex.A"));
    assert_eq!(agg.aggregate_id(), "com.ex.A");
    assert_eq!(agg.type_name(), "hotswap");
}

#[test]
fn filewatch_aggregate_id_uses_path() {
    let agg = AggregateType::file_watch_path(Path::new("/watch/A.class"));
    assert_eq!(agg.aggregate_id(), "/watch/A.class");
    assert_eq!(agg.type_name(), "filewatch");
}

#[test]
fn flow_aggregate_id_uses_detector_id() {
    let agg = AggregateType::flow("hot-swap-complete");
    assert_eq!(agg.aggregate_id(), "hot-swap-complete");
    assert_eq!(agg.type_name(), "flow");
}

#[test]
fn distinct_types_can_share_a_bare_id_but_never_a_type_name() {
    // Two aggregate types can coincidentally produce the same bare id; the
    // store tells them apart by pairing it with `type_name`, not by the id
    // string alone.
    let a = AggregateType::hot_swap(ClassName::new("x"));
    let b = AggregateType::file_watch_path(Path::new("x"));
    assert_eq!(a.aggregate_id(), b.aggregate_id());
    assert_ne!(a.type_name(), b.type_name());
}
