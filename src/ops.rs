//! Set arithmetic and relations.
//!
//! The n-ary functions take slices of [`Operand`], so they work both on sets and on dynamically
//! typed [`Value`]s. A value that doesn't hold a set is rejected with
//! [`SetError::InvalidArgument`].
//!
//! Every result is a new set, with the capability of the first operand.

use crate::prelude::*;
use std::ops::{Add, BitXor, Mul, Sub};

/// Checks every operand, collecting the sets behind them.
fn operands<T: Operand>(sets: &[T]) -> Result<SmallVec<&Set>> {
    sets.iter().map(Operand::as_set).collect()
}

/// Fails on an empty list of operands.
fn nonempty<'a>(sets: &[&'a Set], op: &str) -> Result<&'a Set> {
    sets.first()
        .copied()
        .ok_or_else(|| SetError::InvalidArgument(format!("{op} of no sets")))
}

// -------------------- N-ary arithmetic -------------------- //

/// Union ⋃ of a list of sets.
///
/// ## Errors
///
/// Fails if the list is empty, or if some operand isn't a set.
pub fn union<T: Operand>(sets: &[T]) -> Result<Set> {
    let sets = operands(sets)?;
    let fst = nonempty(&sets, "union")?;

    let res = Set::new();
    for set in &sets {
        for member in *set {
            res.put(member);
        }
    }
    Ok(res.inherit(fst))
}

/// Intersection ⋂ of a list of sets.
///
/// ## Errors
///
/// Fails if the list is empty, or if some operand isn't a set.
pub fn intersection<T: Operand>(sets: &[T]) -> Result<Set> {
    let sets = operands(sets)?;
    let fst = nonempty(&sets, "intersection")?;

    let mut res = fst.copy();
    for set in &sets[1..] {
        if res.is_empty() {
            break;
        }
        res = res.filter(|member| set.has(member));
    }
    Ok(res.inherit(fst))
}

/// Relative complement x ∖ y: the members of `fst` that aren't members of `snd`.
///
/// ## Errors
///
/// Fails if some operand isn't a set.
pub fn complement<T: Operand, U: Operand>(fst: &T, snd: &U) -> Result<Set> {
    let (fst, snd) = (fst.as_set()?, snd.as_set()?);
    Ok(fst.filter(|member| !snd.has(member)))
}

/// Symmetric difference of a list of sets, as a left fold.
///
/// Starting from Ø, each set `s` updates the result `r` to (r ∪ s) ∖ (r ∩ s). For three or more
/// sets, this is **not** the same as the members in the union but not in the intersection of
/// all sets. For instance, the symmetric difference of {1, 2}, {1, 3}, and {1, 2, 3, 4} is
/// {1, 4}.
///
/// The symmetric difference of no sets is Ø.
///
/// ## Errors
///
/// Fails if some operand isn't a set.
pub fn difference<T: Operand>(sets: &[T]) -> Result<Set> {
    let sets = operands(sets)?;

    let mut res = Set::new();
    for set in &sets {
        res = res.symmetric_difference(set);
    }

    Ok(match sets.first() {
        Some(fst) => res.inherit(fst),
        None => res,
    })
}

/// Whether every two sets in the list are disjoint.
///
/// ## Errors
///
/// Fails if some operand isn't a set.
pub fn disjoint<T: Operand>(sets: &[T]) -> Result<bool> {
    let sets = operands(sets)?;

    for (i, fst) in sets.iter().enumerate() {
        for snd in &sets[(i + 1)..] {
            if fst.iter().any(|member| snd.has(&member)) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Set equality. Returns false if either value isn't a set.
#[must_use]
pub fn equals(fst: &Value, snd: &Value) -> bool {
    match (fst, snd) {
        (Value::Set(fst), Value::Set(snd)) => fst.equals(snd),
        _ => false,
    }
}

// -------------------- Pairwise arithmetic -------------------- //

impl Set {
    /// Union x ∪ y.
    #[must_use]
    pub fn union(&self, other: &Set) -> Set {
        let res = self.copy();
        for member in other {
            res.put(member);
        }
        res
    }

    /// Intersection x ∩ y.
    #[must_use]
    pub fn intersection(&self, other: &Set) -> Set {
        self.filter(|member| other.has(member))
    }

    /// Relative complement x ∖ y.
    #[must_use]
    pub fn complement(&self, other: &Set) -> Set {
        self.filter(|member| !other.has(member))
    }

    /// Symmetric difference x ∆ y.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Set) -> Set {
        self.union(other).complement(&self.intersection(other))
    }

    /// Whether the sets have no members in common.
    #[must_use]
    pub fn is_disjoint(&self, other: &Set) -> bool {
        !self.iter().any(|member| other.has(&member))
    }
}

/// Union.
impl Add for &Set {
    type Output = Set;

    fn add(self, rhs: &Set) -> Set {
        self.union(rhs)
    }
}

/// Relative complement.
impl Sub for &Set {
    type Output = Set;

    fn sub(self, rhs: &Set) -> Set {
        self.complement(rhs)
    }
}

/// Intersection.
impl Mul for &Set {
    type Output = Set;

    fn mul(self, rhs: &Set) -> Set {
        self.intersection(rhs)
    }
}

/// Symmetric difference.
impl BitXor for &Set {
    type Output = Set;

    fn bitxor(self, rhs: &Set) -> Set {
        self.symmetric_difference(rhs)
    }
}

// -------------------- Relations -------------------- //

/// A relation between two sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Subset ⊆.
    Subset,
    /// Strict subset ⊂.
    StrictSubset,
    /// Superset ⊇.
    Superset,
    /// Strict superset ⊃.
    StrictSuperset,
    /// Equality.
    Equal,
    /// Inequality.
    NotEqual,
}

impl Set {
    /// Tests a relation against an operand.
    ///
    /// ## Errors
    ///
    /// Fails with [`SetError::InvalidArgument`] if the operand isn't a set.
    pub fn compare<T: Operand>(&self, rel: Relation, other: &T) -> Result<bool> {
        let other = other.as_set()?;
        Ok(match rel {
            Relation::Subset => self.subset_of(other),
            Relation::StrictSubset => self.strict_subset_of(other),
            Relation::Superset => self.superset_of(other),
            Relation::StrictSuperset => self.strict_superset_of(other),
            Relation::Equal => self.equals(other),
            Relation::NotEqual => !self.equals(other),
        })
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl PartialEq<Value> for Set {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

/// Sets are partially ordered by inclusion.
impl PartialOrd for Set {
    fn le(&self, other: &Self) -> bool {
        self.subset_of(other)
    }

    fn ge(&self, other: &Self) -> bool {
        other.le(self)
    }

    fn lt(&self, other: &Self) -> bool {
        self.strict_subset_of(other)
    }

    fn gt(&self, other: &Self) -> bool {
        other.lt(self)
    }

    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let cmp = self.card().cmp(&other.card());
        let test = match cmp {
            Ordering::Equal => self.eq(other),
            Ordering::Less => self.le(other),
            Ordering::Greater => self.ge(other),
        };

        if test {
            Some(cmp)
        } else {
            None
        }
    }
}
