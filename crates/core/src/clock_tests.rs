// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advances_monotonically() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now(), start);
    let advanced = clock.advance(chrono::Duration::seconds(5));
    assert_eq!(advanced, start + chrono::Duration::seconds(5));
    assert_eq!(clock.now(), advanced);
}

#[test]
fn fake_clock_set_overrides_time() {
    let clock = FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let target = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn system_clock_returns_roughly_now() {
    let before = Utc::now();
    let reading = SystemClock.now();
    let after = Utc::now();
    assert!(reading >= before && reading <= after);
}
