//! Members of a [`Set`]: [`Scalar`] and [`Value`].

use crate::{prelude::*, utils::PairPath};
use derive_more::{From, IsVariant};
use std::hash::{Hash, Hasher};

// -------------------- Scalars -------------------- //

/// A primitive value, compared and hashed by value.
///
/// Floats are compared through a canonical bit pattern, so that every NaN is equal to every other
/// NaN, and `-0.0` is equal to `0.0`. Integers and floats are never equal to each other.
#[derive(Clone, From, IsVariant)]
pub enum Scalar {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(Rc<str>),
}

impl Scalar {
    /// Canonical bits for a float.
    fn float_bits(x: f64) -> u64 {
        if x.is_nan() {
            f64::NAN.to_bits()
        } else if x == 0.0 {
            0
        } else {
            x.to_bits()
        }
    }

    /// Position of each kind of scalar within the default order.
    fn kind(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Str(_) => 2,
        }
    }

    /// Total order on scalars: booleans, then numbers, then strings.
    ///
    /// Numbers compare by magnitude. An integer comes before a float of the same magnitude.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::float_bits(*a) == Self::float_bits(*b),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(x) => Self::float_bits(*x).hash(state),
            Self::Str(s) => s.hash(state),
        }
    }
}

impl Debug for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Strings are quoted depending on [`Config::quote_strings`](crate::config::Config).
impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Str(s) if !crate::config::get().quote_strings => f.write_str(s),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

// -------------------- Values -------------------- //

/// A member of a [`Set`].
///
/// Scalars live in a hashed partition of a set and are found in constant time. Lists and sets are
/// structural members: they're compared deeply, by a linear scan.
///
/// Cloning a [`Value::Set`] clones the handle, not the set.
#[derive(Clone, From, IsVariant)]
pub enum Value {
    /// A primitive value.
    Scalar(Scalar),
    /// An immutable sequence, compared element-wise.
    List(Rc<[Value]>),
    /// A nested set, compared by structural equality.
    Set(Set),
}

/// Implements [`From`] for [`Value`] through [`Scalar`].
macro_rules! from_scalar {
    ($($t: ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

from_scalar!(bool, i32, u32, i64, f64, &str, String, Rc<str>);

impl From<&Set> for Value {
    fn from(set: &Set) -> Self {
        Self::Set(set.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Self::List(list.into())
    }
}

impl Value {
    /// Returns the set held by this value, if any.
    #[must_use]
    pub fn as_set_ref(&self) -> Option<&Set> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the scalar held by this value, if any.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The [`Rank`] of the value.
    ///
    /// See [`Set::rank`].
    #[must_use]
    pub fn rank(&self) -> Rank {
        match self {
            Self::Set(set) => set.rank(),
            _ => Rank::Finite(0),
        }
    }

    /// Structural equality, threading the pairs of sets being compared.
    pub(crate) fn eq_guarded(&self, other: &Self, path: &mut PairPath) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter().zip(b.iter()).all(|(x, y)| x.eq_guarded(y, path)))
            }
            (Self::Set(a), Self::Set(b)) => a.eq_guarded(b, path),
            _ => false,
        }
    }

    /// A total order on values, used by [`Set::sorted`].
    ///
    /// Scalars come first, then lists, then sets. Scalars use [`Scalar::total_cmp`], lists compare
    /// lexicographically, and sets compare by cardinality and then by identity. Distinct members of
    /// a single set never compare as [`Ordering::Equal`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.total_cmp(b),
            (Self::List(a), Self::List(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.total_cmp(y))
                .find(|cmp| cmp.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Self::Set(a), Self::Set(b)) => a.card().cmp(&b.card()).then(a.id().cmp(&b.id())),
            (Self::Scalar(_), _) | (Self::List(_), Self::Set(_)) => Ordering::Less,
            _ => Ordering::Greater,
        }
    }

    /// Writes the value, threading the sets along the current rendering path.
    pub(crate) fn render(&self, f: &mut Formatter<'_>, path: &mut Path) -> FmtResult {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::List(list) => {
                f.write_char('[')?;
                for (i, value) in list.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    value.render(f, path)?;
                }
                f.write_char(']')
            }
            Self::Set(set) => set.render(f, path),
        }
    }
}

/// Structural equality. Terminates even on cyclic sets.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_guarded(other, &mut PairPath::new())
    }
}

impl PartialEq<Set> for Value {
    fn eq(&self, other: &Set) -> bool {
        matches!(self, Self::Set(set) if set == other)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.render(f, &mut Path::new())
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod value {
    use super::*;
    use crate::set;

    #[test]
    fn float_canonical() {
        assert_eq!(Scalar::Float(f64::NAN), Scalar::Float(-f64::NAN));
        assert_eq!(Scalar::Float(0.0), Scalar::Float(-0.0));
        assert_ne!(Scalar::Float(1.0), Scalar::Int(1));
    }

    #[test]
    fn scalar_order() {
        let mut scalars: Vec<Scalar> = vec![
            "b".into(),
            Scalar::Float(1.5),
            true.into(),
            Scalar::Int(2),
            "a".into(),
            Scalar::Int(1),
            Scalar::Float(1.0),
        ];
        scalars.sort_by(Scalar::total_cmp);

        let names: Vec<String> = scalars.iter().map(|s| format!("{s:?}")).collect();
        assert_eq!(names, ["true", "1", "1.0", "1.5", "2", "\"a\"", "\"b\""]);
    }

    #[test]
    fn list_eq() {
        let a = Value::from(vec![Value::from(1), Value::from(set![2, 3])]);
        let b = Value::from(vec![Value::from(1), Value::from(set![3, 2])]);
        let c = Value::from(vec![Value::from(1), Value::from(set![3])]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Value::from(1));
    }

    #[test]
    fn display() {
        let v = Value::from(vec![Value::from("x"), Value::from(2.5), Value::from(set![])]);
        assert_eq!(v.to_string(), "[\"x\", 2.5, {}]");

        let unquoted = crate::config::Config {
            quote_strings: false,
            ..Default::default()
        };
        assert_eq!(crate::config::with(unquoted, || v.to_string()), "[x, 2.5, {}]");
    }

    #[test]
    fn rank() {
        assert_eq!(Value::from("x").rank(), Rank::Finite(0));
        assert_eq!(Value::from(set![set![]]).rank(), Rank::Finite(2));
    }
}
