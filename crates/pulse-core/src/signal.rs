//! Read-only cancellation signal that flips to "aborted" exactly once.
//!
//! A signal comes in two halves:
//!
//! - [`AbortSignal`]: cheaply cloneable, read-only. Anyone holding one can
//!   poll `is_aborted()` without subscribing to anything.
//! - [`AbortController`]: the write half. Only its owner can abort.
//!
//! # Tracing
//!
//! The first (and only effective) `abort()` emits a `DEBUG` event
//! `signal.abort` with the `signal_id` field.
//!
//! # Example
//!
//! ```
//! use pulse_core::signal::AbortController;
//!
//! let ctrl = AbortController::new();
//! let signal = ctrl.signal();
//! assert!(!signal.is_aborted());
//!
//! assert!(ctrl.abort());
//! assert!(signal.is_aborted());
//! assert!(!ctrl.abort()); // already aborted
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thiserror::Error;

// ─── Signal ID generation ────────────────────────────────────────────────────

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(1);

fn next_signal_id() -> u64 {
    NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed)
}

// ─── Metrics counters ────────────────────────────────────────────────────────

static SIGNAL_ABORTS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total number of signal abort transitions observed (for diagnostics).
#[must_use]
pub fn signal_aborts_total() -> u64 {
    SIGNAL_ABORTS_TOTAL.load(Ordering::Relaxed)
}

// ─── Inner shared state ──────────────────────────────────────────────────────

#[derive(Debug)]
struct SignalInner {
    id: u64,
    aborted: AtomicBool,
}

// ─── AbortSignal ─────────────────────────────────────────────────────────────

/// Read-only view of an abort flag.
#[derive(Clone, Debug)]
pub struct AbortSignal {
    inner: Arc<SignalInner>,
}

impl AbortSignal {
    /// Unique identifier for this signal (for tracing/logging).
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether the signal has been aborted.
    #[inline]
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Return `Err(Aborted)` once the signal has been aborted.
    pub fn check(&self) -> Result<(), Aborted> {
        if self.is_aborted() {
            Err(Aborted { signal_id: self.id() })
        } else {
            Ok(())
        }
    }

    /// Whether two handles observe the same underlying flag.
    #[must_use]
    pub fn same_signal(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ─── AbortController ─────────────────────────────────────────────────────────

/// Write half of an [`AbortSignal`].
///
/// Dropping the controller does **not** abort the signal.
#[derive(Debug)]
pub struct AbortController {
    inner: Arc<SignalInner>,
}

impl AbortController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: next_signal_id(),
                aborted: AtomicBool::new(false),
            }),
        }
    }

    /// A read-only handle to this controller's signal.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Abort the signal. Returns `true` only for the call that performed the
    /// transition.
    pub fn abort(&self) -> bool {
        let was_aborted = self.inner.aborted.swap(true, Ordering::AcqRel);
        if !was_aborted {
            SIGNAL_ABORTS_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(message = "signal.abort", signal_id = self.inner.id);
        }
        !was_aborted
    }

    #[inline]
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Aborted ─────────────────────────────────────────────────────────────────

/// Returned by [`AbortSignal::check`] after the signal has been aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signal {signal_id} aborted")]
pub struct Aborted {
    pub signal_id: u64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
