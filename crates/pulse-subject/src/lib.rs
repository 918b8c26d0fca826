#![forbid(unsafe_code)]

//! Subjects: multicast hubs that are both [`Observer`](pulse_core::Observer)
//! and [`Observable`](pulse_core::Observable).
//!
//! - [`ReplayChannel`]: fans notifications out to every subscriber and
//!   replays the last N values (plus any terminal notification) to late
//!   subscribers.
//! - [`BehaviorSubject`]: a value-holding node built on a one-slot
//!   `ReplayChannel`. Reading the current value is O(1) and synchronous.
//! - [`guard`]: structural recognition of behavior subjects behind a
//!   dynamic boundary.
//! - [`boundary`]: argument-count, receiver, and operand checks for callers
//!   that cannot rely on the type system (scripting hosts, FFI shims).
//!
//! # Invariants
//!
//! 1. Every subscriber is replayed the buffered notifications before any
//!    live notification reaches it.
//! 2. Subscribers are notified in registration order.
//! 3. The terminal transition happens at most once and aborts the channel's
//!    signal at that instant.
//! 4. Notifications raised re-entrantly from inside a handler are delivered
//!    after the current one has reached every subscriber (FIFO).

pub mod behavior;
pub mod boundary;
pub mod guard;
pub mod replay;

pub use behavior::BehaviorSubject;
pub use boundary::{Operand, Operation, Outcome, construct, invoke};
pub use guard::{
    Dynamic, Member, Reflect, Shape, Slot, is_behavior_subject, is_behavior_subject_args,
};
pub use replay::ReplayChannel;
