//! # Sets with structural equality
//!
//! A [`Set`] holds [scalars](Scalar), immutable lists, and other sets, and deduplicates them by
//! *value*: two members are the same whenever they have the same structure, regardless of where
//! they live in memory. This makes sets of sets behave like their mathematical counterparts.
//!
//! Sets are handles with shared ownership. Adding a set to another stores the handle, so later
//! mutations of the inner set are visible through the outer one. In particular, sets can contain
//! each other cyclically (though never directly themselves). Every recursive traversal in this
//! crate guards against such cycles and terminates.
//!
//! ```
//! use valset::{set, prelude::*};
//!
//! let s = set![1, set![2, set![3, 4], set![5]], set![6]];
//! assert_eq!(s.rank(), Rank::Finite(3));
//! assert_eq!(s.of_rank(1, false), set![set![6]]);
//! assert_eq!(s.at_level(2).unwrap(), set![2, set![3, 4], set![5], 6]);
//! ```

#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod config;
pub mod error;
pub mod levels;
pub mod ops;
pub mod prelude;
pub mod set;
pub mod table;
pub mod utils;
pub mod value;

mod tests;

use prelude::*;

pub use error::Result;
pub use set::Set;
pub use value::Value;

/// Small vector.
type SmallVec<T> = smallvec::SmallVec<[T; 4]>;

/// Builds a mutable [`Set`] from a list of values.
///
/// Each expression is converted through [`Value::from`]. Duplicates collapse.
///
/// ```
/// use valset::{set, Set};
///
/// let s = set![1, 2, 2, "three", set![4]];
/// assert_eq!(s.card(), 4);
/// assert_eq!(set![], Set::new());
/// ```
#[macro_export]
macro_rules! set {
    () => (
        $crate::set::Set::new()
    );
    ($($x: expr), +$(,)?) => (
        $crate::set::Set::from_values([$($crate::value::Value::from($x)), +])
    );
}

/// A seal for [`Operand`], avoiding foreign implementations.
trait Seal {}

/// Something that can be passed as an operand to a relational or arithmetic operation.
///
/// Only [`Set`] and [`Value`] implement this trait. Checking a [`Value`] operand fails with
/// [`SetError::InvalidArgument`] unless it holds a set.
#[allow(private_bounds)]
pub trait Operand: Seal {
    /// Returns the set this operand stands for.
    ///
    /// ## Errors
    ///
    /// Fails with [`SetError::InvalidArgument`] if the operand is not a set.
    fn as_set(&self) -> Result<&Set>;
}

impl Seal for Set {}
impl Operand for Set {
    fn as_set(&self) -> Result<&Set> {
        Ok(self)
    }
}

impl Seal for Value {}
impl Operand for Value {
    fn as_set(&self) -> Result<&Set> {
        match self {
            Value::Set(set) => Ok(set),
            other => Err(SetError::InvalidArgument(format!(
                "expected a set, got {other}"
            ))),
        }
    }
}

impl<T: Operand + ?Sized> Seal for &T {}
impl<T: Operand + ?Sized> Operand for &T {
    fn as_set(&self) -> Result<&Set> {
        (**self).as_set()
    }
}
