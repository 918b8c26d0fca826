#![forbid(unsafe_code)]

//! Core: push-notification contracts, subscriptions, and cancellation signals.
//!
//! - [`Observer`]: consumer of value, completion, and error notifications.
//! - [`Observable`]: producer that accepts an observer and hands back a
//!   [`Subscription`].
//! - [`Notification`]: one delivered event, replayable to late subscribers.
//! - [`AbortSignal`]: read-only flag that flips exactly once.
//! - [`SubjectError`]: failures raised at call boundaries.

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
#[cfg(any(test, feature = "test-helpers"))]
pub mod recorder;
pub mod signal;

pub use error::SubjectError;
pub use notification::Notification;
pub use observable::{Observable, Source, Subscription};
pub use observer::{CallbackObserver, Observer};
#[cfg(any(test, feature = "test-helpers"))]
pub use recorder::Recorder;
pub use signal::{AbortController, AbortSignal, Aborted};
