#![forbid(unsafe_code)]

//! Multicast hub that replays the last N values to late subscribers.
//!
//! # Design
//!
//! [`ReplayChannel<T, E>`] keeps its state in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Subscribers are owned by the channel as
//! `Rc<dyn Observer>` entries and released either when their
//! [`Subscription`] is dropped or right after the terminal notification has
//! been delivered to them.
//!
//! State changes (buffer, terminal flag, signal) are applied immediately.
//! Delivery goes through a FIFO queue of sequence-numbered notifications that
//! is drained by the outermost call. Each subscriber remembers the sequence
//! number current at its registration and skips queued notifications that its
//! replay already covered.
//!
//! # Performance
//!
//! | Operation     | Complexity                          |
//! |---------------|-------------------------------------|
//! | `next()`      | O(S) where S = subscribers          |
//! | `subscribe()` | O(N) where N = buffered values      |
//! | unsubscribe   | O(log S + S)                        |
//!
//! # Failure Modes
//!
//! - **Observer panics**: the panic propagates to the caller of
//!   `next()`/`complete()`/`error()`. If that call owned the drain loop, the
//!   delivery queue is cleared and notifications still queued at the time are
//!   lost; the channel stays usable.
//! - **Observer panics during replay**: the observer is unregistered before
//!   the panic leaves `subscribe()`. A nested `subscribe()` from inside a
//!   handler leaves the outer drain and its queue untouched.
//! - **Re-entrant calls**: no `RefCell` borrow is held while user code runs,
//!   so handlers may call back into the channel (including `subscribe()` and
//!   dropping their own `Subscription`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use pulse_core::{AbortController, AbortSignal, Notification, Observable, Observer, Subscription};

type ObserverRc<T, E> = Rc<dyn Observer<T, E>>;

/// How the channel terminated.
#[derive(Debug, Clone)]
enum Terminal<E> {
    Return,
    Throw(E),
}

impl<E> Terminal<E> {
    fn into_notification<T>(self) -> Notification<T, E> {
        match self {
            Self::Return => Notification::Return,
            Self::Throw(error) => Notification::Throw(error),
        }
    }
}

struct Entry<T, E> {
    id: u64,
    /// Sequence number current at registration; only later notifications
    /// are delivered live.
    since: u64,
    observer: ObserverRc<T, E>,
}

/// Shared interior for [`ReplayChannel<T, E>`].
struct ReplayInner<T, E> {
    capacity: usize,
    buffer: VecDeque<T>,
    terminal: Option<Terminal<E>>,
    /// Sorted by `id` (ids are allocated monotonically).
    subscribers: Vec<Entry<T, E>>,
    next_id: u64,
    seq: u64,
    queue: VecDeque<(u64, Notification<T, E>)>,
    draining: bool,
    controller: AbortController,
}

impl<T, E> ReplayInner<T, E> {
    fn enqueue(&mut self, notification: Notification<T, E>) {
        self.seq += 1;
        self.queue.push_back((self.seq, notification));
    }

    /// Claim the drain loop. Returns `true` if the caller must drain.
    fn claim_drain(&mut self) -> bool {
        !std::mem::replace(&mut self.draining, true)
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.subscribers
            .binary_search_by_key(&id, |e| e.id)
            .is_ok()
    }

    fn remove(&mut self, id: u64) -> Option<Entry<T, E>> {
        let index = self.subscribers.binary_search_by_key(&id, |e| e.id).ok()?;
        Some(self.subscribers.remove(index))
    }
}

/// Resets the drain state if a handler unwinds out of the drain loop.
struct DrainReset<'a, T, E> {
    inner: &'a RefCell<ReplayInner<T, E>>,
}

impl<T, E> Drop for DrainReset<'_, T, E> {
    fn drop(&mut self) {
        if std::thread::panicking()
            && let Ok(mut inner) = self.inner.try_borrow_mut()
        {
            inner.draining = false;
            inner.queue.clear();
        }
    }
}

/// Unregisters the observer of a replay that unwound. The drain state is
/// reset only if this `subscribe()` claimed it.
struct ReplayUnwind<'a, T, E> {
    inner: &'a RefCell<ReplayInner<T, E>>,
    id: Option<u64>,
    owns_drain: bool,
}

impl<T, E> Drop for ReplayUnwind<'_, T, E> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        let removed = self.id.and_then(|id| inner.remove(id));
        if self.owns_drain {
            inner.draining = false;
            inner.queue.clear();
        }
        drop(inner);
        drop(removed);
    }
}

/// A multicast hub that fans notifications out synchronously and replays the
/// last `capacity` values to late subscribers.
///
/// After termination, new subscribers receive the buffered values followed
/// by the terminal notification, and are not registered.
///
/// Cloning a `ReplayChannel` creates a new handle to the **same** channel.
///
/// # Invariants
///
/// 1. At most `capacity` values are buffered; the oldest is evicted first.
/// 2. The terminal transition happens once; `next`/`complete`/`error`
///    afterwards return `false` and change nothing.
/// 3. The signal is aborted at the terminal transition, before delivery.
/// 4. Live subscribers are notified in registration order.
pub struct ReplayChannel<T, E> {
    inner: Rc<RefCell<ReplayInner<T, E>>>,
    signal: AbortSignal,
}

impl<T, E> Clone for ReplayChannel<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            signal: self.signal.clone(),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for ReplayChannel<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReplayChannel")
            .field("capacity", &inner.capacity)
            .field("buffer", &inner.buffer)
            .field("terminal", &inner.terminal)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> ReplayChannel<T, E> {
    /// Create a channel that replays up to `capacity` values.
    ///
    /// A capacity of 0 gives a plain multicast hub: late subscribers only
    /// see the terminal notification, if any.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let controller = AbortController::new();
        let signal = controller.signal();
        Self {
            inner: Rc::new(RefCell::new(ReplayInner {
                capacity,
                buffer: VecDeque::with_capacity(capacity),
                terminal: None,
                subscribers: Vec::new(),
                next_id: 0,
                seq: 0,
                queue: VecDeque::new(),
                draining: false,
                controller,
            })),
            signal,
        }
    }

    /// Push a value. Returns `false` if the channel has already terminated.
    pub fn next(&self, value: T) -> bool {
        let drain = {
            let mut inner = self.inner.borrow_mut();
            if inner.terminal.is_some() {
                return false;
            }
            if inner.capacity > 0 {
                if inner.buffer.len() == inner.capacity {
                    inner.buffer.pop_front();
                }
                inner.buffer.push_back(value.clone());
            }
            inner.enqueue(Notification::Next(value));
            inner.claim_drain()
        };
        if drain {
            self.drain();
        }
        true
    }

    /// Complete successfully. Returns `false` if already terminated.
    pub fn complete(&self) -> bool {
        self.terminate(Terminal::Return)
    }

    /// Terminate with `error`. Returns `false` if already terminated.
    pub fn error(&self, error: E) -> bool {
        self.terminate(Terminal::Throw(error))
    }

    fn terminate(&self, terminal: Terminal<E>) -> bool {
        let drain = {
            let mut inner = self.inner.borrow_mut();
            if inner.terminal.is_some() {
                return false;
            }
            inner.terminal = Some(terminal.clone());
            inner.controller.abort();
            inner.enqueue(terminal.into_notification());
            inner.claim_drain()
        };
        if drain {
            self.drain();
        }
        true
    }

    /// Register `observer`, replaying buffered notifications synchronously.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        let observer: ObserverRc<T, E> = Rc::new(observer);
        let (id, replay, terminal, drain) = {
            let mut inner = self.inner.borrow_mut();
            let replay: Vec<T> = inner.buffer.iter().cloned().collect();
            let terminal = inner.terminal.clone();
            let id = if terminal.is_none() {
                let id = inner.next_id;
                inner.next_id += 1;
                let since = inner.seq;
                inner.subscribers.push(Entry {
                    id,
                    since,
                    observer: Rc::clone(&observer),
                });
                Some(id)
            } else {
                None
            };
            (id, replay, terminal, inner.claim_drain())
        };

        tracing::debug!(
            message = "replay.subscribe",
            subscriber_id = ?id,
            replayed = replay.len(),
            terminal = terminal.is_some()
        );

        {
            let _unwind = ReplayUnwind {
                inner: &*self.inner,
                id,
                owns_drain: drain,
            };
            for value in replay {
                observer.next(value);
            }
            if let Some(terminal) = terminal {
                terminal.into_notification().deliver(&*observer);
            }
        }
        if drain {
            self.drain();
        }

        match id {
            Some(id) => {
                let weak = Rc::downgrade(&self.inner);
                Subscription::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        let removed = inner.borrow_mut().remove(id);
                        if removed.is_some() {
                            tracing::trace!(message = "replay.unsubscribe", subscriber_id = id);
                        }
                        drop(removed);
                    }
                })
            }
            None => Subscription::empty(),
        }
    }

    /// Deliver queued notifications until the queue is empty.
    fn drain(&self) {
        let _reset = DrainReset { inner: &*self.inner };
        loop {
            let (notification, targets) = {
                let mut inner = self.inner.borrow_mut();
                let Some((seq, notification)) = inner.queue.pop_front() else {
                    inner.draining = false;
                    break;
                };
                let targets: Vec<(u64, ObserverRc<T, E>)> = inner
                    .subscribers
                    .iter()
                    .filter(|e| e.since < seq)
                    .map(|e| (e.id, Rc::clone(&e.observer)))
                    .collect();
                (notification, targets)
            };

            for (id, observer) in &targets {
                // Skip observers unsubscribed by an earlier handler in this round.
                if !self.inner.borrow().is_subscribed(*id) {
                    continue;
                }
                notification.clone().deliver(&**observer);
            }

            if notification.is_terminal() {
                let released = std::mem::take(&mut self.inner.borrow_mut().subscribers);
                tracing::debug!(
                    message = "replay.terminal",
                    kind = notification.kind(),
                    subscribers = released.len()
                );
                drop(released);
            }
        }
    }

    /// The read-only signal aborted at the terminal transition.
    #[must_use]
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Whether `complete()` or `error()` has been accepted.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.signal.is_aborted()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Maximum number of replayed values.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Snapshot of the replay buffer, oldest first.
    #[must_use]
    pub fn buffered(&self) -> Vec<T> {
        self.inner.borrow().buffer.iter().cloned().collect()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Observer<T, E> for ReplayChannel<T, E> {
    fn next(&self, value: T) {
        ReplayChannel::next(self, value);
    }

    fn complete(&self) {
        ReplayChannel::complete(self);
    }

    fn error(&self, error: E) {
        ReplayChannel::error(self, error);
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Observable<T, E> for ReplayChannel<T, E> {
    fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        ReplayChannel::subscribe(self, observer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
