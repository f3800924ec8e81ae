// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cm_core::Event;
use std::sync::atomic::{AtomicUsize, Ordering};

fn stopped() -> Event {
    Event::WorkflowStopped
}

fn started(n: usize) -> Event {
    Event::WorkflowStarted { module_count: n }
}

#[test]
fn general_subscriber_observes_every_event() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    bus.subscribe_all(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(started(3));
    bus.emit(stopped());

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn per_type_subscriber_ignores_other_kinds() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    bus.on("workflow:started", move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(stopped());
    assert_eq!(count.load(Ordering::SeqCst), 0);

    bus.emit(started(1));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn once_fires_a_single_time_then_detaches() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    bus.once("workflow:started", move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(started(1));
    bus.emit(started(2));

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn remove_all_listeners_detaches_per_type_subscribers() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    bus.on("workflow:started", move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    bus.remove_all_listeners("workflow:started");

    bus.emit(started(1));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn has_subscribers_reflects_current_state() {
    let bus = EventBus::new();
    assert!(!bus.has_subscribers());
    bus.on("workflow:started", |_| {});
    assert!(bus.has_subscribers());
}

#[test]
fn history_keeps_bounded_fifo_order() {
    let bus = EventBus::new();
    bus.enable_history(2);

    bus.emit(started(1));
    bus.emit(started(2));
    bus.emit(started(3));

    let history = bus.get_history();
    assert_eq!(history.len(), 2);
    assert!(matches!(history[0], Event::WorkflowStarted { module_count: 2 }));
    assert!(matches!(history[1], Event::WorkflowStarted { module_count: 3 }));
}

#[test]
fn history_by_type_filters_correctly() {
    let bus = EventBus::new();
    bus.enable_history(10);
    bus.emit(started(1));
    bus.emit(stopped());

    assert_eq!(bus.get_history_by_type("workflow:started").len(), 1);
    assert_eq!(bus.get_history_by_type("workflow:stopped").len(), 1);

    bus.clear_history();
    assert!(bus.get_history().is_empty());
}

#[test]
fn panicking_listener_does_not_stop_later_listeners() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);

    bus.subscribe_all(|_| {
        panic!("boom");
    });
    bus.subscribe_all(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(stopped());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn unsubscribe_from_inside_a_listener_does_not_deadlock() {
    let bus = EventBus::new();
    let bus_clone = bus.clone();
    bus.on("workflow:started", move |_| {
        bus_clone.remove_all_listeners("workflow:started");
    });

    bus.emit(started(1));
    bus.emit(started(2));
}
