// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_does_not_go_backwards() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
}

#[test]
fn fake_clock_measures_advanced_time() {
    let clock = FakeClock::new();
    let started = clock.now();
    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.since(started), Duration::from_secs(90));
}

#[test]
fn since_saturates_for_future_instants() {
    let clock = FakeClock::new();
    let later = clock.now() + Duration::from_secs(5);
    assert_eq!(clock.since(later), Duration::ZERO);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.since(t1), Duration::from_secs(30));
}

#[test]
fn clock_is_usable_as_trait_object() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let t1 = clock.now();
    assert_eq!(clock.since(t1), Duration::ZERO);
}
