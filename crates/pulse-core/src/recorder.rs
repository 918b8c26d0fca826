//! Observer that records every notification it receives.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notification::Notification;
use crate::observer::Observer;

/// Records notifications in arrival order.
///
/// Cloning a `Recorder` creates a new handle to the **same** log, so one
/// clone can be handed to a producer while the test keeps the other.
pub struct Recorder<T, E> {
    log: Rc<RefCell<Vec<Notification<T, E>>>>,
}

impl<T, E> Clone for Recorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Recorder<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("log", &self.log.borrow())
            .finish()
    }
}

impl<T, E> Default for Recorder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Recorder<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<Notification<T, E>> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl<T: Clone, E: Clone> Recorder<T, E> {
    /// Snapshot of the log.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification<T, E>> {
        self.log.borrow().clone()
    }
}

impl<T, E> Observer<T, E> for Recorder<T, E> {
    fn next(&self, value: T) {
        self.log.borrow_mut().push(Notification::Next(value));
    }

    fn complete(&self) {
        self.log.borrow_mut().push(Notification::Return);
    }

    fn error(&self, error: E) {
        self.log.borrow_mut().push(Notification::Throw(error));
    }
}
