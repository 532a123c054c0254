//! Errors raised by set operations.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = SetError> = std::result::Result<T, E>;

/// Errors that can occur while working with a [`Set`](crate::Set).
///
/// Errors are raised synchronously by the offending call. Cycles in membership are never an error
/// for read-only traversals.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SetError {
    /// An operand to a relational or arithmetic operation is not a set.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mutator was called on a frozen set.
    #[error("cannot {0} a frozen set")]
    ImmutabilityViolation(&'static str),

    /// A level or rank argument is outside of its domain.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A set was added to itself.
    #[error("a set cannot contain itself")]
    SelfMembership,
}
