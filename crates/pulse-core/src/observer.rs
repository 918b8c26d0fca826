#![forbid(unsafe_code)]

//! Consumers of push notifications.
//!
//! # Design
//!
//! [`Observer<T, E>`] takes `&self` on every handler: observers are shared
//! (`Rc`) between the producer that delivers to them and the code that built
//! them, so any state they accumulate lives behind interior mutability.
//!
//! All three handlers are optional. The default `next` and `complete` do
//! nothing; the default `error` emits an `observer.unhandled_error` warning so
//! that a failed stream with nobody listening for failure is still visible in
//! logs.

use std::fmt;
use std::rc::Rc;

/// A consumer of value, completion, and error notifications.
pub trait Observer<T, E> {
    /// Receive a value.
    fn next(&self, value: T) {
        let _ = value;
    }

    /// Receive successful completion.
    fn complete(&self) {}

    /// Receive failed termination.
    fn error(&self, error: E) {
        let _ = error;
        tracing::warn!(message = "observer.unhandled_error");
    }
}

impl<T, E, O> Observer<T, E> for Rc<O>
where
    O: Observer<T, E> + ?Sized,
{
    fn next(&self, value: T) {
        (**self).next(value);
    }

    fn complete(&self) {
        (**self).complete();
    }

    fn error(&self, error: E) {
        (**self).error(error);
    }
}

impl<T, E, O> Observer<T, E> for &O
where
    O: Observer<T, E> + ?Sized,
{
    fn next(&self, value: T) {
        (**self).next(value);
    }

    fn complete(&self) {
        (**self).complete();
    }

    fn error(&self, error: E) {
        (**self).error(error);
    }
}

type NextFn<T> = Box<dyn Fn(T)>;
type CompleteFn = Box<dyn Fn()>;
type ErrorFn<E> = Box<dyn Fn(E)>;

/// An observer assembled from closures.
///
/// Handlers that are not set fall back to the [`Observer`] defaults.
///
/// ```
/// use pulse_core::{CallbackObserver, Observer};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0));
/// let seen_clone = Rc::clone(&seen);
/// let observer = CallbackObserver::<i32, ()>::new().on_next(move |v| seen_clone.set(v));
/// observer.next(3);
/// assert_eq!(seen.get(), 3);
/// ```
pub struct CallbackObserver<T, E> {
    next: Option<NextFn<T>>,
    complete: Option<CompleteFn>,
    error: Option<ErrorFn<E>>,
}

impl<T, E> CallbackObserver<T, E> {
    /// Create an observer with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: None,
            complete: None,
            error: None,
        }
    }

    /// Set the value handler.
    #[must_use]
    pub fn on_next(mut self, f: impl Fn(T) + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    /// Set the completion handler.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Set the error handler.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(E) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl<T, E> Default for CallbackObserver<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for CallbackObserver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackObserver")
            .field("next", &self.next.is_some())
            .field("complete", &self.complete.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

impl<T, E> Observer<T, E> for CallbackObserver<T, E> {
    fn next(&self, value: T) {
        if let Some(f) = &self.next {
            f(value);
        }
    }

    fn complete(&self) {
        if let Some(f) = &self.complete {
            f();
        }
    }

    fn error(&self, error: E) {
        match &self.error {
            Some(f) => f(error),
            None => tracing::warn!(message = "observer.unhandled_error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    struct Unit;
    impl Observer<i32, ()> for Unit {}

    #[test]
    fn default_handlers_are_inert() {
        let o = Unit;
        o.next(1);
        o.complete();
        o.error(());
    }

    #[test]
    fn callbacks_fire() {
        let values = Rc::new(RefCell::new(Vec::new()));
        let done = Rc::new(Cell::new(false));
        let failed = Rc::new(Cell::new(None));

        let v = Rc::clone(&values);
        let d = Rc::clone(&done);
        let e = Rc::clone(&failed);
        let o = CallbackObserver::<i32, u8>::new()
            .on_next(move |x| v.borrow_mut().push(x))
            .on_complete(move || d.set(true))
            .on_error(move |x| e.set(Some(x)));

        o.next(1);
        o.next(2);
        o.complete();
        o.error(9);

        assert_eq!(*values.borrow(), vec![1, 2]);
        assert!(done.get());
        assert_eq!(failed.get(), Some(9));
    }

    #[test]
    fn rc_forwards() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let o: Rc<dyn Observer<i32, ()>> =
            Rc::new(CallbackObserver::new().on_next(move |_| c.set(c.get() + 1)));
        o.next(1);
        Rc::clone(&o).next(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn debug_reports_installed_handlers() {
        let o = CallbackObserver::<i32, ()>::new().on_complete(|| {});
        let dbg = format!("{o:?}");
        assert!(dbg.contains("complete: true"));
        assert!(dbg.contains("next: false"));
    }

    struct WarnCapture {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl<S: Subscriber> Layer<S> for WarnCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg(Option<String>);
            impl tracing::field::Visit for Msg {
                fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                    if field.name() == "message" {
                        self.0 = Some(value.to_string());
                    }
                }

                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.0 = Some(format!("{value:?}").trim_matches('"').to_string());
                    }
                }
            }
            let mut msg = Msg(None);
            event.record(&mut msg);
            if let Some(m) = msg.0 {
                self.seen.lock().expect("capture lock").push(m);
            }
        }
    }

    #[test]
    fn unhandled_error_is_logged() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(WarnCapture {
            seen: Arc::clone(&seen),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        CallbackObserver::<i32, &str>::new().error("lost");

        let seen = seen.lock().expect("capture lock");
        assert!(seen.iter().any(|m| m == "observer.unhandled_error"));
    }
}
