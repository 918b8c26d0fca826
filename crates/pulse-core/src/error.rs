use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubjectError>;

/// Failures raised synchronously at a call boundary.
///
/// Carried application errors (the payload of `error()`) are never
/// represented here; they travel as [`Notification::Throw`](crate::Notification::Throw).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("{required} argument required but {present} present")]
    ArgumentArity { required: usize, present: usize },

    #[error("receiver is not a genuine {expected}")]
    InvalidReceiver { expected: &'static str },

    #[error("parameter {position} is not of type '{expected}'")]
    TypeOperand {
        position: usize,
        expected: &'static str,
    },
}

impl SubjectError {
    #[must_use]
    pub fn arity(required: usize, present: usize) -> Self {
        Self::ArgumentArity { required, present }
    }

    #[must_use]
    pub fn receiver(expected: &'static str) -> Self {
        Self::InvalidReceiver { expected }
    }

    #[must_use]
    pub fn operand(position: usize, expected: &'static str) -> Self {
        Self::TypeOperand { position, expected }
    }
}
