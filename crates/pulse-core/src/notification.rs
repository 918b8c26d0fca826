//! A single push event.

use crate::observer::Observer;

/// One of the three notification kinds, in push order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T, E> {
    /// A value.
    Next(T),
    /// Successful completion.
    Return,
    /// Failed termination carrying an application error.
    Throw(E),
}

impl<T, E> Notification<T, E> {
    /// Whether this notification ends the stream.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Return | Self::Throw(_))
    }

    /// Short label used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Next(_) => "next",
            Self::Return => "return",
            Self::Throw(_) => "throw",
        }
    }

    /// Hand this notification to `observer`.
    pub fn deliver<O>(self, observer: &O)
    where
        O: Observer<T, E> + ?Sized,
    {
        match self {
            Self::Next(value) => observer.next(value),
            Self::Return => observer.complete(),
            Self::Throw(error) => observer.error(error),
        }
    }
}
