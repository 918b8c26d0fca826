#![forbid(unsafe_code)]

//! End-to-end scenarios for `BehaviorSubject`.
//!
//! Validates that:
//! 1. A subscriber sees the latest value first, then live values, then the
//!    terminal notification.
//! 2. Late subscribers after termination see exactly `[last value, terminal]`.
//! 3. A subject can sit between an upstream source and many downstream
//!    subscribers.
//! 4. Subscribers re-entering the subject from a handler observe one
//!    coherent order.

use std::cell::RefCell;
use std::rc::Rc;

use pulse_core::notification::Notification::{Next, Return, Throw};
use pulse_core::{CallbackObserver, Observable, Observer, Recorder, Source};
use pulse_subject::{BehaviorSubject, ReplayChannel};

#[derive(Debug, Clone, PartialEq)]
struct AppError(String);

impl AppError {
    fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}

// ============================================================================
// Scenario A: values, completion, late subscriber
// ============================================================================

#[test]
fn scenario_a_complete() {
    let c = BehaviorSubject::<i32, AppError>::new(0);
    c.next(1);
    c.next(2);

    let early = Recorder::new();
    let _early = c.subscribe(early.clone());
    assert_eq!(early.notifications(), vec![Next(2)]);

    c.complete();
    assert_eq!(early.notifications(), vec![Next(2), Return]);

    let late = Recorder::new();
    let _late = c.subscribe(late.clone());
    assert_eq!(late.notifications(), vec![Next(2), Return]);

    // Nothing more, ever.
    c.next(3);
    c.error(AppError::new("ignored"));
    c.complete();
    assert_eq!(early.notifications(), vec![Next(2), Return]);
    assert_eq!(late.notifications(), vec![Next(2), Return]);
    assert_eq!(c.value(), 2);
}

// ============================================================================
// Scenario B: error carried as data
// ============================================================================

#[test]
fn scenario_b_error() {
    let c = BehaviorSubject::<&str, AppError>::new("a");
    let rec = Recorder::new();
    let _sub = c.subscribe(rec.clone());
    assert_eq!(rec.notifications(), vec![Next("a")]);

    c.error(AppError::new("x"));
    assert_eq!(rec.notifications(), vec![Next("a"), Throw(AppError::new("x"))]);

    let late = Recorder::new();
    let _late = c.subscribe(late.clone());
    assert_eq!(late.notifications(), vec![Next("a"), Throw(AppError::new("x"))]);
    assert!(c.signal().is_aborted());
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn upstream_source_fans_out_through_subject() {
    let source = Source::<i32, AppError>::new(|o| {
        for v in [1, 2, 3] {
            o.next(v);
        }
        o.error(AppError::new("upstream failed"));
    });
    let subject = BehaviorSubject::<i32, AppError>::new(0);

    let recorders: Vec<Recorder<i32, AppError>> = (0..3).map(|_| Recorder::new()).collect();
    let _subs: Vec<_> = recorders.iter().map(|r| subject.subscribe(r.clone())).collect();

    let _upstream = source.subscribe(subject.clone());

    for rec in &recorders {
        assert_eq!(
            rec.notifications(),
            vec![
                Next(0),
                Next(1),
                Next(2),
                Next(3),
                Throw(AppError::new("upstream failed"))
            ]
        );
    }
    assert_eq!(subject.value(), 3);
    assert_eq!(subject.subscriber_count(), 0);
}

#[test]
fn subject_chains_into_replay_channel() {
    let subject = BehaviorSubject::<i32, ()>::new(10);
    let channel = ReplayChannel::<i32, ()>::new(3);
    let _link = subject.subscribe(channel.clone());

    subject.next(11);
    subject.next(12);
    subject.complete();

    let rec = Recorder::new();
    let _sub = channel.subscribe(rec.clone());
    assert_eq!(rec.notifications(), vec![Next(10), Next(11), Next(12), Return]);
}

#[test]
fn subject_observes_another_subject() {
    let upstream = BehaviorSubject::<&str, ()>::new("seed");
    let downstream = BehaviorSubject::<&str, ()>::new("placeholder");

    let _link = upstream.subscribe(downstream.clone());
    assert_eq!(downstream.value(), "seed");

    upstream.next("fresh");
    assert_eq!(downstream.value(), "fresh");

    upstream.complete();
    assert!(downstream.is_terminal());
}

#[test]
fn unsubscribed_observer_stops_receiving() {
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let rec = Recorder::new();
    let sub = subject.subscribe(rec.clone());
    subject.next(1);
    sub.unsubscribe();
    subject.next(2);
    subject.complete();
    assert_eq!(rec.notifications(), vec![Next(0), Next(1)]);
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[test]
fn handler_driven_counter_is_coherent() {
    // A handler keeps bumping the value until it reaches 3; a second
    // subscriber must see the same sequence without interleaving.
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let driver_log = Rc::new(RefCell::new(Vec::new()));
    let watcher = Recorder::new();

    let s = subject.clone();
    let log = Rc::clone(&driver_log);
    let _driver = subject.subscribe(CallbackObserver::new().on_next(move |v: i32| {
        log.borrow_mut().push(v);
        if v > 0 && v < 3 {
            s.next(v + 1);
        }
    }));
    let _watcher = subject.subscribe(watcher.clone());

    subject.next(1);

    assert_eq!(*driver_log.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(
        watcher.notifications(),
        vec![Next(0), Next(1), Next(2), Next(3)]
    );
    assert_eq!(subject.value(), 3);
}

#[test]
fn handler_completing_subject_mid_delivery() {
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let first: Recorder<i32, ()> = Recorder::new();
    let second = Recorder::new();

    let s = subject.clone();
    let first_log = first.clone();
    let _first = subject.subscribe(
        CallbackObserver::new()
            .on_next(move |v: i32| {
                first_log.next(v);
                if v == 5 {
                    s.complete();
                }
            })
            .on_complete({
                let log = first.clone();
                move || log.complete()
            }),
    );
    let _second = subject.subscribe(second.clone());

    subject.next(5);
    subject.next(6);

    assert_eq!(first.notifications(), vec![Next(0), Next(5), Return]);
    assert_eq!(second.notifications(), vec![Next(0), Next(5), Return]);
    assert_eq!(subject.value(), 5);
}
