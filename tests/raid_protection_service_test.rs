//! Integration tests for the raid protection service.

use std::time::Duration;

use ward_bot::event::LockdownLiftedEvent;
use ward_bot::event::RaidDetectedEvent;

mod common;

use common::RecordingSubscriber;
use common::setup_service;
use common::t;
use common::wait_for;

#[test]
fn test_no_lockdown_below_threshold() {
    let (service, _bus) = setup_service(10, 60);

    // 9 joins spread over t=0..9s
    for i in 0..9 {
        service.record_join("G1", &format!("member-{i}"), t(i * 1000));
    }

    assert!(!service.is_raid_in_progress("G1", t(9_000)));
    service.evaluate_and_handle("G1", t(9_000));
    assert!(!service.is_lockdown_active("G1"));
}

#[test]
fn test_tenth_join_trips_threshold() {
    let (service, bus) = setup_service(10, 60);
    let detected = RecordingSubscriber::<RaidDetectedEvent>::new();
    bus.register_subscriber::<RaidDetectedEvent, _>(detected.clone());

    for i in 0..9 {
        service.record_join("G1", &format!("member-{i}"), t(i * 1000));
    }
    assert!(!service.is_raid_in_progress("G1", t(9_000)));

    service.record_join("G1", "member-9", t(10_000));
    assert!(service.is_raid_in_progress("G1", t(10_000)));

    service.evaluate_and_handle("G1", t(10_000));
    assert!(service.is_lockdown_active("G1"));

    assert!(wait_for(|| detected.count() == 1));
    let events = detected.events();
    assert_eq!(events[0].guild_id, "G1");
    assert_eq!(events[0].activated_at, t(10_000));
}

#[test]
fn test_threshold_comparison_is_inclusive() {
    let (service, _bus) = setup_service(10, 60);

    // Exactly threshold-many joins must trip the heuristic.
    for i in 0..10 {
        service.record_join("G1", &format!("member-{i}"), t(0));
    }

    assert!(service.is_raid_in_progress("G1", t(0)));
}

#[test]
fn test_same_millisecond_joins_are_distinct() {
    let (service, _bus) = setup_service(5, 60);

    for i in 0..5 {
        service.record_join("G1", &format!("member-{i}"), t(42));
    }

    assert_eq!(service.window_len("G1", t(42)), 5);
    assert!(service.is_raid_in_progress("G1", t(42)));
}

#[test]
fn test_count_decays_without_sweep() {
    let (service, _bus) = setup_service(10, 60);

    for i in 0..10 {
        service.record_join("G1", &format!("member-{i}"), t(i * 1000));
    }
    assert!(service.is_raid_in_progress("G1", t(9_000)));

    // A full timeframe after the last join, nothing is in the window even
    // though no sweep has run.
    assert!(!service.is_raid_in_progress("G1", t(69_000)));
    assert_eq!(service.window_len("G1", t(69_000)), 0);
}

#[test]
fn test_evaluate_is_idempotent_while_active() {
    let (service, bus) = setup_service(10, 60);
    let detected = RecordingSubscriber::<RaidDetectedEvent>::new();
    bus.register_subscriber::<RaidDetectedEvent, _>(detected.clone());

    for i in 0..15 {
        service.record_join("G1", &format!("member-{i}"), t(1_000));
    }
    service.evaluate_and_handle("G1", t(1_000));
    service.evaluate_and_handle("G1", t(2_000));
    service.evaluate_and_handle("G1", t(3_000));

    assert!(wait_for(|| detected.count() >= 1));
    // Give the bus a moment to deliver any (incorrect) duplicates.
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(detected.count(), 1);
}

#[test]
fn test_disable_lockdown_when_never_active() {
    let (service, bus) = setup_service(10, 60);
    let lifted = RecordingSubscriber::<LockdownLiftedEvent>::new();
    bus.register_subscriber::<LockdownLiftedEvent, _>(lifted.clone());

    assert!(!service.disable_lockdown("G2"));

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(lifted.count(), 0);
}

#[test]
fn test_disable_lockdown_fires_lifted_event() {
    let (service, bus) = setup_service(3, 60);
    let lifted = RecordingSubscriber::<LockdownLiftedEvent>::new();
    bus.register_subscriber::<LockdownLiftedEvent, _>(lifted.clone());

    for i in 0..3 {
        service.record_join("G1", &format!("member-{i}"), t(0));
    }
    service.evaluate_and_handle("G1", t(0));
    assert!(service.is_lockdown_active("G1"));

    assert!(service.disable_lockdown("G1"));
    assert!(!service.is_lockdown_active("G1"));
    assert_eq!(service.lockdown_activated_at("G1"), None);

    assert!(wait_for(|| lifted.count() == 1));
    assert_eq!(lifted.events()[0].guild_id, "G1");
}

#[test]
fn test_retrigger_after_manual_disable() {
    let (service, bus) = setup_service(10, 60);
    let detected = RecordingSubscriber::<RaidDetectedEvent>::new();
    bus.register_subscriber::<RaidDetectedEvent, _>(detected.clone());

    for i in 0..10 {
        service.record_join("G1", &format!("member-{i}"), t(0));
    }
    service.evaluate_and_handle("G1", t(0));
    assert!(service.is_lockdown_active("G1"));

    // Disabling must not clear the window.
    assert!(service.disable_lockdown("G1"));
    assert_eq!(service.window_len("G1", t(5_000)), 10);

    // One more join inside the original timeframe re-trips immediately.
    service.handle_join("G1", "member-10", t(5_000));
    assert!(service.is_lockdown_active("G1"));
    assert_eq!(service.lockdown_activated_at("G1"), Some(t(5_000)));

    assert!(wait_for(|| detected.count() == 2));
}

#[test]
fn test_sweep_empties_expired_windows() {
    let (service, _bus) = setup_service(10, 60);

    for i in 0..10 {
        service.record_join("G1", &format!("member-{i}"), t(i * 1000));
    }
    service.evaluate_and_handle("G1", t(10_000));

    let outcome = service.sweep(t(70_000));
    assert_eq!(outcome.evicted_entries, 10);
    assert_eq!(outcome.dropped_guilds, 1);
    assert_eq!(service.window_len("G1", t(70_000)), 0);
}

#[test]
fn test_sweep_never_touches_lockdown_state() {
    let (service, _bus) = setup_service(5, 60);

    for i in 0..5 {
        service.record_join("G1", &format!("member-{i}"), t(0));
    }
    service.evaluate_and_handle("G1", t(0));
    assert!(service.is_lockdown_active("G1"));

    service.sweep(t(120_000));

    assert!(service.is_lockdown_active("G1"));
    assert_eq!(service.lockdown_activated_at("G1"), Some(t(0)));
}

#[test]
fn test_sweep_keeps_fresh_entries() {
    let (service, _bus) = setup_service(10, 60);

    service.record_join("G1", "old", t(0));
    service.record_join("G1", "fresh", t(50_000));
    service.record_join("G2", "old", t(0));

    let outcome = service.sweep(t(61_000));

    assert_eq!(outcome.evicted_entries, 2);
    assert_eq!(outcome.dropped_guilds, 1);
    assert_eq!(service.window_len("G1", t(61_000)), 1);
    assert_eq!(service.recent_joiners("G1", t(61_000)), vec!["fresh"]);
}

#[test]
fn test_windows_are_tracked_per_guild() {
    let (service, _bus) = setup_service(3, 60);

    for i in 0..3 {
        service.handle_join("G1", &format!("member-{i}"), t(0));
    }
    service.handle_join("G2", "member-0", t(0));

    assert!(service.is_lockdown_active("G1"));
    assert!(!service.is_lockdown_active("G2"));
    assert_eq!(service.window_len("G2", t(0)), 1);
}
