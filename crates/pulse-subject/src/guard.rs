//! Structural recognition of behavior subjects behind a dynamic boundary.
//!
//! Inside Rust the type system already says whether something is a
//! [`BehaviorSubject`]. Hosts that hand us loosely typed objects (scripting
//! bindings, plugin tables) describe them through [`Reflect`], and
//! [`is_behavior_subject`] checks the required members:
//!
//! | member      | requirement                         |
//! |-------------|-------------------------------------|
//! | `value`     | present (any kind)                  |
//! | `subscribe` | callable                            |
//! | `next`      | callable                            |
//! | `return`    | callable                            |
//! | `throw`     | callable                            |
//! | `signal`    | a genuine [`AbortSignal`]           |

use std::collections::BTreeMap;

use pulse_core::{AbortSignal, SubjectError};

use crate::behavior::BehaviorSubject;

const CALLABLE_MEMBERS: [&str; 4] = ["subscribe", "next", "return", "throw"];

/// Kind of a member exposed through [`Reflect`].
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// Readable data of any type.
    Data,
    /// An invocable operation.
    Callable,
    /// A cancellation signal.
    Signal(&'a AbortSignal),
}

/// Capability query over an object's members.
pub trait Reflect {
    fn member(&self, name: &str) -> Option<Member<'_>>;
}

/// A loosely typed value as handed over by a dynamic caller.
#[derive(Clone, Copy)]
pub enum Dynamic<'a> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(&'a str),
    Object(&'a dyn Reflect),
}

impl std::fmt::Debug for Dynamic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Whether `value` structurally satisfies the behavior-subject contract.
///
/// Never panics; anything that is not an object, or lacks one of the
/// required members, yields `false`.
#[must_use]
pub fn is_behavior_subject(value: &Dynamic<'_>) -> bool {
    let Dynamic::Object(object) = value else {
        return false;
    };
    object.member("value").is_some()
        && CALLABLE_MEMBERS
            .iter()
            .all(|name| matches!(object.member(name), Some(Member::Callable)))
        && matches!(object.member("signal"), Some(Member::Signal(_)))
}

/// Call-boundary form of [`is_behavior_subject`]: fails only when no argument
/// was supplied.
pub fn is_behavior_subject_args(args: &[Dynamic<'_>]) -> Result<bool, SubjectError> {
    args.first()
        .map(is_behavior_subject)
        .ok_or(SubjectError::arity(1, 0))
}

impl<T: Clone + 'static, E: Clone + 'static> Reflect for BehaviorSubject<T, E> {
    fn member(&self, name: &str) -> Option<Member<'_>> {
        match name {
            "value" => Some(Member::Data),
            "subscribe" | "next" | "return" | "throw" => Some(Member::Callable),
            "signal" => Some(Member::Signal(self.signal())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Owned counterpart of [`Member`], stored in a [`Shape`].
#[derive(Debug, Clone)]
pub enum Slot {
    Data,
    Callable,
    Signal(AbortSignal),
}

/// A hand-assembled object description, for foreign objects that do not
/// implement [`Reflect`] themselves.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    members: BTreeMap<String, Slot>,
}

impl Shape {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, slot: Slot) -> Self {
        self.members.insert(name.into(), slot);
        self
    }

    /// Remove a member.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.members.remove(name);
        self
    }

    /// A shape carrying every member the behavior-subject contract requires.
    #[must_use]
    pub fn behavior_like(signal: AbortSignal) -> Self {
        CALLABLE_MEMBERS
            .iter()
            .fold(Self::new().with("value", Slot::Data), |shape, name| {
                shape.with(*name, Slot::Callable)
            })
            .with("signal", Slot::Signal(signal))
    }
}

impl Reflect for Shape {
    fn member(&self, name: &str) -> Option<Member<'_>> {
        self.members.get(name).map(|slot| match slot {
            Slot::Data => Member::Data,
            Slot::Callable => Member::Callable,
            Slot::Signal(signal) => Member::Signal(signal),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::AbortController;

    fn custom() -> Shape {
        Shape::behavior_like(AbortController::new().signal())
    }

    #[test]
    fn genuine_subject_is_recognized() {
        let subject = BehaviorSubject::<f64, ()>::new(0.5);
        assert!(is_behavior_subject(&Dynamic::Object(&subject)));
    }

    #[test]
    fn custom_shape_is_recognized() {
        let shape = custom();
        assert!(is_behavior_subject(&Dynamic::Object(&shape)));
    }

    #[test]
    fn empty_object_is_rejected() {
        assert!(!is_behavior_subject(&Dynamic::Object(&Shape::new())));
    }

    #[test]
    fn null_and_undefined_are_rejected() {
        assert!(!is_behavior_subject(&Dynamic::Null));
        assert!(!is_behavior_subject(&Dynamic::Undefined));
    }

    #[test]
    fn primitives_are_rejected() {
        assert!(!is_behavior_subject(&Dynamic::Bool(true)));
        assert!(!is_behavior_subject(&Dynamic::Number(1.0)));
        assert!(!is_behavior_subject(&Dynamic::Str("value")));
    }

    #[test]
    fn missing_value_is_rejected() {
        let shape = custom().without("value");
        assert!(!is_behavior_subject(&Dynamic::Object(&shape)));
    }

    #[test]
    fn non_callable_operations_are_rejected() {
        for name in CALLABLE_MEMBERS {
            let shape = custom().with(name, Slot::Data);
            assert!(
                !is_behavior_subject(&Dynamic::Object(&shape)),
                "'{name}' must be callable"
            );
        }
    }

    #[test]
    fn missing_operations_are_rejected() {
        for name in CALLABLE_MEMBERS {
            let shape = custom().without(name);
            assert!(!is_behavior_subject(&Dynamic::Object(&shape)));
        }
    }

    #[test]
    fn non_signal_is_rejected() {
        let shape = custom().with("signal", Slot::Data);
        assert!(!is_behavior_subject(&Dynamic::Object(&shape)));
        let shape = custom().without("signal");
        assert!(!is_behavior_subject(&Dynamic::Object(&shape)));
    }

    #[test]
    fn value_may_be_any_kind() {
        let shape = custom().with("value", Slot::Callable);
        assert!(is_behavior_subject(&Dynamic::Object(&shape)));
    }

    #[test]
    fn args_form_requires_one_argument() {
        assert_eq!(is_behavior_subject_args(&[]), Err(SubjectError::arity(1, 0)));
        assert_eq!(is_behavior_subject_args(&[Dynamic::Null]), Ok(false));

        let subject = BehaviorSubject::<i32, ()>::new(1);
        assert_eq!(
            is_behavior_subject_args(&[Dynamic::Object(&subject), Dynamic::Null]),
            Ok(true)
        );
    }

    #[test]
    fn dynamic_debug_hides_object_contents() {
        let shape = custom();
        assert_eq!(format!("{:?}", Dynamic::Object(&shape)), "Object(..)");
        assert_eq!(format!("{:?}", Dynamic::Number(2.0)), "Number(2.0)");
    }
}
