//! Checked entry points for callers that bypass the type system.
//!
//! A scripting host or FFI shim sees a behavior subject as an opaque
//! receiver plus a list of loosely typed arguments. [`construct`] and
//! [`invoke`] re-establish the guarantees that Rust callers get for free:
//!
//! 1. the receiver must be a genuine [`BehaviorSubject<T, E>`], checked
//!    first so that a foreign receiver never touches any state;
//! 2. `subscribe` requires an argument (`ArgumentArity`);
//! 3. arguments must have the expected kind (`TypeOperand`).
//!
//! `next` and `throw` carry no arity check. A host calling them without an
//! argument is passing its "undefined", which is not a `T` or an `E`, so the
//! missing operand is reported as `TypeOperand` for parameter 1.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use pulse_core::error::Result;
use pulse_core::{Observer, SubjectError, Subscription};

use crate::behavior::BehaviorSubject;

/// Operation requested through [`invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Value,
    Next,
    Return,
    Throw,
    Subscribe,
}

impl Operation {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Next => "next",
            Self::Return => "return",
            Self::Throw => "throw",
            Self::Subscribe => "subscribe",
        }
    }
}

/// A single argument handed across the boundary.
pub enum Operand<T, E> {
    Value(T),
    Error(E),
    Observer(Rc<dyn Observer<T, E>>),
    /// Anything the host could not map onto the kinds above.
    Foreign(Box<dyn Any>),
}

impl<T, E> fmt::Debug for Operand<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Value(_) => "Value",
            Self::Error(_) => "Error",
            Self::Observer(_) => "Observer",
            Self::Foreign(_) => "Foreign",
        };
        write!(f, "Operand::{kind}(..)")
    }
}

/// What an invoked operation produced.
#[derive(Debug)]
pub enum Outcome<T> {
    Value(T),
    Unit,
    Subscribed(Subscription),
}

/// Construct a subject from a loosely typed argument list.
///
/// The first argument becomes the initial value; extra arguments are ignored.
pub fn construct<T, E>(args: impl IntoIterator<Item = T>) -> Result<BehaviorSubject<T, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let initial = args.into_iter().next().ok_or(SubjectError::arity(1, 0))?;
    Ok(BehaviorSubject::new(initial))
}

/// Invoke `operation` on `receiver` with `args`.
pub fn invoke<T, E>(
    receiver: Option<&dyn Any>,
    operation: Operation,
    args: Vec<Operand<T, E>>,
) -> Result<Outcome<T>>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let subject = genuine::<T, E>(receiver).inspect_err(|_| {
        tracing::debug!(
            message = "boundary.invalid_receiver",
            operation = operation.name()
        );
    })?;

    let mut args = args.into_iter();
    match operation {
        Operation::Value => Ok(Outcome::Value(subject.value())),
        Operation::Next => match args.next() {
            Some(Operand::Value(value)) => {
                subject.next(value);
                Ok(Outcome::Unit)
            }
            Some(_) | None => Err(SubjectError::operand(1, "Value")),
        },
        Operation::Return => {
            subject.complete();
            Ok(Outcome::Unit)
        }
        Operation::Throw => match args.next() {
            Some(Operand::Error(error)) => {
                subject.error(error);
                Ok(Outcome::Unit)
            }
            Some(_) | None => Err(SubjectError::operand(1, "Error")),
        },
        Operation::Subscribe => match args.next() {
            Some(Operand::Observer(observer)) => {
                Ok(Outcome::Subscribed(subject.subscribe(observer)))
            }
            Some(_) => Err(SubjectError::operand(1, "Observer")),
            None => Err(SubjectError::arity(1, 0)),
        },
    }
}

fn genuine<T, E>(receiver: Option<&dyn Any>) -> Result<&BehaviorSubject<T, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    receiver
        .and_then(|r| r.downcast_ref::<BehaviorSubject<T, E>>())
        .ok_or(SubjectError::receiver(BehaviorSubject::<T, E>::TYPE_NAME))
}
