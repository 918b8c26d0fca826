#![forbid(unsafe_code)]

//! Value-holding subject that replays its current value to every subscriber.
//!
//! # Design
//!
//! [`BehaviorSubject<T, E>`] owns exactly one [`ReplayChannel`] with a
//! capacity of 1 and tracks the current value next to it, so reading the
//! value never goes through the channel. The initial value is a mandatory
//! constructor parameter and is pushed into the channel before anyone can
//! subscribe.
//!
//! # Invariants
//!
//! 1. `value()` equals the argument of the last accepted `next()`, or the
//!    initial value if there was none.
//! 2. After `complete()` or `error()`, `next()` is ignored and the value is
//!    frozen.
//! 3. Every subscriber first receives the current value; late subscribers
//!    after termination receive `[Next(value), terminal]` and nothing else.
//! 4. The channel is created at construction and never replaced or handed
//!    out; clones of a `BehaviorSubject` are handles to the same container.
//!
//! # Failure Modes
//!
//! - **Re-entrant `next()` inside `with()`**: allowed. `with()` pins the value
//!   current at the call, so the closure keeps seeing it while a nested
//!   `next()` installs the new one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pulse_core::{AbortSignal, Observable, Observer, Subscription};

use crate::replay::ReplayChannel;

/// Shared interior for [`BehaviorSubject<T, E>`].
struct BehaviorInner<T, E> {
    value: RefCell<Rc<T>>,
    channel: ReplayChannel<T, E>,
}

/// A push-based container that remembers the most recent value and hands it
/// synchronously to every new subscriber.
///
/// It is both an [`Observer`] (hand it to any [`Observable`] to mirror that
/// source) and an [`Observable`].
///
/// ```
/// use pulse_core::{CallbackObserver, Observer};
/// use pulse_subject::BehaviorSubject;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let subject = BehaviorSubject::<i32, ()>::new(0);
/// subject.next(1);
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_clone = Rc::clone(&seen);
/// let _sub = subject.subscribe(
///     CallbackObserver::new().on_next(move |v| seen_clone.borrow_mut().push(v)),
/// );
/// subject.next(2);
///
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// assert_eq!(subject.value(), 2);
/// ```
pub struct BehaviorSubject<T, E> {
    inner: Rc<BehaviorInner<T, E>>,
}

impl<T, E> Clone for BehaviorSubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug + Clone + 'static, E: fmt::Debug + Clone + 'static> fmt::Debug
    for BehaviorSubject<T, E>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorSubject")
            .field("value", &**self.inner.value.borrow())
            .field("terminal", &self.inner.channel.is_terminal())
            .field("subscriber_count", &self.inner.channel.subscriber_count())
            .finish()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> BehaviorSubject<T, E> {
    /// Name used in receiver diagnostics.
    pub const TYPE_NAME: &'static str = "BehaviorSubject";

    /// Create a subject holding `value`.
    ///
    /// The value is pushed into the channel immediately, so a subscriber
    /// arriving before any `next()` still observes it.
    #[must_use]
    pub fn new(value: T) -> Self {
        let channel = ReplayChannel::new(1);
        channel.next(value.clone());
        Self {
            inner: Rc::new(BehaviorInner {
                value: RefCell::new(Rc::new(value)),
                channel,
            }),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        T::clone(&self.inner.value.borrow())
    }

    /// Access the current value by reference without cloning it.
    ///
    /// The closure may call back into the subject; it keeps seeing the value
    /// that was current when `with()` was called.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let current = Rc::clone(&self.inner.value.borrow());
        f(&current)
    }

    /// Record `value` and deliver it to every subscriber. Ignored after
    /// termination.
    pub fn next(&self, value: T) {
        if self.inner.channel.is_terminal() {
            tracing::trace!(message = "behavior.next_ignored");
            return;
        }
        *self.inner.value.borrow_mut() = Rc::new(value.clone());
        self.inner.channel.next(value);
    }

    /// Complete successfully. Idempotent.
    pub fn complete(&self) {
        self.inner.channel.complete();
    }

    /// Terminate with `error`, delivered to subscribers as data. Idempotent.
    pub fn error(&self, error: E) {
        self.inner.channel.error(error);
    }

    /// Register `observer`. The current value (and the terminal notification,
    /// if any) is delivered before this returns.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        self.inner.channel.subscribe(observer)
    }

    /// Read-only signal aborted at the first terminal transition.
    #[must_use]
    pub fn signal(&self) -> &AbortSignal {
        self.inner.channel.signal()
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.inner.channel.is_terminal()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.channel.subscriber_count()
    }

    /// Whether both handles refer to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Observer<T, E> for BehaviorSubject<T, E> {
    fn next(&self, value: T) {
        BehaviorSubject::next(self, value);
    }

    fn complete(&self) {
        BehaviorSubject::complete(self);
    }

    fn error(&self, error: E) {
        BehaviorSubject::error(self, error);
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Observable<T, E> for BehaviorSubject<T, E> {
    fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        BehaviorSubject::subscribe(self, observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
