//! Unit tests for clock.rs

use std::sync::Arc;
use crate::clock::Clock;
use crate::mock_platform::MockPlatform;

// ============================================================================
// CLOCK TESTS
// ============================================================================

#[test]
fn test_clock_starts_stopped() {
    let clock = Clock::new(Arc::new(MockPlatform::new(5.0)));
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed(), 0.0);
}

#[test]
fn test_clock_start_records_start_time() {
    let platform = Arc::new(MockPlatform::new(12.5));
    let mut clock = Clock::new(platform.clone());

    clock.start();

    assert!(clock.is_running());
    assert_eq!(clock.start_time(), 12.5);
    assert_eq!(clock.elapsed(), 0.0);
}

#[test]
fn test_clock_update_measures_elapsed() {
    let platform = Arc::new(MockPlatform::new(1.0));
    let mut clock = Clock::new(platform.clone());
    clock.start();

    platform.advance(0.25);
    clock.update();

    assert!((clock.elapsed() - 0.25).abs() < 1e-9);
}

#[test]
fn test_clock_update_ignored_when_not_started() {
    let platform = Arc::new(MockPlatform::new(1.0));
    let mut clock = Clock::new(platform.clone());

    platform.advance(3.0);
    clock.update();

    assert_eq!(clock.elapsed(), 0.0);
}

#[test]
fn test_clock_stop_keeps_elapsed() {
    let platform = Arc::new(MockPlatform::new(0.0));
    let mut clock = Clock::new(platform.clone());
    clock.start();
    platform.advance(2.0);
    clock.update();

    clock.stop();
    platform.advance(10.0);
    clock.update();

    assert!(!clock.is_running());
    assert!((clock.elapsed() - 2.0).abs() < 1e-9);
}

#[test]
fn test_clock_restart_resets_elapsed() {
    let platform = Arc::new(MockPlatform::new(0.0));
    let mut clock = Clock::new(platform.clone());
    clock.start();
    platform.advance(4.0);
    clock.update();

    clock.start();

    assert_eq!(clock.elapsed(), 0.0);
    assert_eq!(clock.start_time(), 4.0);
}
