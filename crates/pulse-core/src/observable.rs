#![forbid(unsafe_code)]

//! Producers of push notifications.
//!
//! # Design
//!
//! An [`Observable<T, E>`] accepts an [`Observer`] and returns a
//! [`Subscription`]. The subscription is an RAII guard: dropping it detaches
//! the observer from the producer. Producers that finish their work inside
//! `subscribe()` (such as a synchronous [`Source`]) return an already-closed
//! guard.
//!
//! # Failure Modes
//!
//! - **Discarded guard**: `let _ = source.subscribe(..)` drops the guard at
//!   the end of the statement, unsubscribing immediately. Bind it
//!   (`let _sub = ..`) or call [`Subscription::detach`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::observer::Observer;

/// A producer that accepts subscription by an [`Observer`].
pub trait Observable<T, E> {
    /// Register `observer` and return the guard that keeps it registered.
    fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static;
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a registered observer.
///
/// Dropping the `Subscription` runs its teardown exactly once, which removes
/// the observer from the producer.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription whose teardown runs on unsubscribe or drop.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// An already-closed subscription.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Whether the teardown has already run (or there was nothing to tear down).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }

    /// Detach the observer from its producer now.
    pub fn unsubscribe(mut self) {
        self.run_teardown();
    }

    /// Give up the guard without tearing down. The observer then stays
    /// registered for as long as the producer keeps it.
    pub fn detach(mut self) {
        self.teardown = None;
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

type Producer<T, E> = dyn Fn(&dyn Observer<T, E>);

/// A cold observable built from a producer closure.
///
/// Every `subscribe()` runs the producer against the new observer. The
/// observer handed to the producer is guarded: once a terminal notification
/// has been delivered, further notifications are dropped.
///
/// ```
/// use pulse_core::{CallbackObserver, Observable, Observer, Source};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let source = Source::<i32, ()>::new(|o| {
///     o.next(1);
///     o.next(2);
///     o.complete();
/// });
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_clone = Rc::clone(&seen);
/// let _sub = source.subscribe(
///     CallbackObserver::new().on_next(move |v| seen_clone.borrow_mut().push(v)),
/// );
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Source<T, E> {
    producer: Rc<Producer<T, E>>,
}

impl<T, E> Clone for Source<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Rc::clone(&self.producer),
        }
    }
}

impl<T, E> fmt::Debug for Source<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").finish_non_exhaustive()
    }
}

impl<T, E> Source<T, E> {
    #[must_use]
    pub fn new(producer: impl Fn(&dyn Observer<T, E>) + 'static) -> Self {
        Self {
            producer: Rc::new(producer),
        }
    }
}

impl<T, E> Observable<T, E> for Source<T, E> {
    fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        let guarded = Guarded {
            inner: observer,
            closed: Cell::new(false),
        };
        (self.producer)(&guarded);
        Subscription::empty()
    }
}

/// Stops forwarding after the first terminal notification.
struct Guarded<O> {
    inner: O,
    closed: Cell<bool>,
}

impl<T, E, O: Observer<T, E>> Observer<T, E> for Guarded<O> {
    fn next(&self, value: T) {
        if !self.closed.get() {
            self.inner.next(value);
        }
    }

    fn complete(&self) {
        if !self.closed.replace(true) {
            self.inner.complete();
        }
    }

    fn error(&self, error: E) {
        if !self.closed.replace(true) {
            self.inner.error(error);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Notification::{Next, Return, Throw};
    use crate::recorder::Recorder;

    #[test]
    fn drop_runs_teardown_once() {
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let sub = Subscription::new(move || c.set(c.get() + 1));
        assert!(!sub.is_closed());
        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_runs_teardown() {
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        Subscription::new(move || c.set(c.get() + 1)).unsubscribe();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn detach_skips_teardown() {
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        Subscription::new(move || c.set(c.get() + 1)).detach();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn empty_is_closed() {
        assert!(Subscription::empty().is_closed());
        assert!(format!("{:?}", Subscription::empty()).contains("closed: true"));
    }

    #[test]
    fn source_replays_per_subscriber() {
        let source = Source::<i32, ()>::new(|o| {
            o.next(1);
            o.complete();
        });
        let a = Recorder::new();
        let b = Recorder::new();
        let _ = source.subscribe(a.clone());
        let _ = source.subscribe(b.clone());
        assert_eq!(a.notifications(), vec![Next(1), Return]);
        assert_eq!(b.notifications(), vec![Next(1), Return]);
    }

    #[test]
    fn source_stops_after_terminal() {
        let source = Source::<i32, &str>::new(|o| {
            o.next(1);
            o.error("bad");
            o.next(2);
            o.complete();
        });
        let rec = Recorder::new();
        let sub = source.subscribe(rec.clone());
        assert!(sub.is_closed());
        assert_eq!(rec.notifications(), vec![Next(1), Throw("bad")]);
    }
}
