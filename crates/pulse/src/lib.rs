#![forbid(unsafe_code)]

//! pulse public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use pulse_core as core;
pub use pulse_subject as subject;

pub mod prelude {
    pub use pulse_core::{
        AbortController, AbortSignal, CallbackObserver, Notification, Observable, Observer,
        Source, SubjectError, Subscription,
    };
    pub use pulse_subject::{BehaviorSubject, ReplayChannel, is_behavior_subject};
}
