//! Utility types for working with sets.
//!
//! Most recursive algorithms in this crate thread one of the guards defined here through their
//! calls. A guard is allocated fresh by each top-level call and discarded when it returns.

use crate::prelude::*;
use derive_more::Display;
use std::{
    hash::Hash,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

// -------------------- Identity -------------------- //

/// An opaque identity token, issued to each [`Set`] at construction.
///
/// Tokens are never reused within a process, so two live sets share a token only if they're the
/// same set.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "#{}", _0)]
pub struct SetId(u64);

impl SetId {
    /// Issues a fresh identity token.
    pub(crate) fn fresh() -> Self {
        /// The next token to be issued.
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw value of the token.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

// -------------------- Guards -------------------- //

/// Call-scoped marker set. Once a key is entered, it stays entered until the guard is dropped.
///
/// Used by traversals that must never descend into the same set twice, like
/// [`Set::flatten`](crate::Set::flatten).
#[derive(Debug)]
pub(crate) struct Visited<K = SetId>(HashSet<K>);

impl<K> Default for Visited<K> {
    fn default() -> Self {
        Self(HashSet::new())
    }
}

impl<K: Eq + Hash> Visited<K> {
    /// Initializes an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as visited. Returns whether it was unvisited before.
    pub fn enter(&mut self, key: K) -> bool {
        self.0.insert(key)
    }
}

/// Path-scoped marker set. Keys are entered on the way down a recursion and left on the way up, so
/// only keys along the current path are marked.
///
/// Used by traversals where revisiting a set through a different branch is fine, but revisiting it
/// through its own descendants would loop forever.
#[derive(Debug)]
pub(crate) struct Path<K = SetId>(HashSet<K>);

impl<K> Default for Path<K> {
    fn default() -> Self {
        Self(HashSet::new())
    }
}

impl<K: Eq + Hash + Copy> Path<K> {
    /// Initializes an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with `key` pushed onto the path. If the key is already on the path, returns
    /// `on_cycle` instead.
    pub fn descend<T, F: FnOnce(&mut Self) -> T>(&mut self, key: K, on_cycle: T, f: F) -> T {
        if !self.0.insert(key) {
            return on_cycle;
        }

        let res = f(self);
        self.0.remove(&key);
        res
    }

    /// Whether the key is on the current path.
    pub fn contains(&self, key: &K) -> bool {
        self.0.contains(key)
    }
}

/// Guard for structural equality.
///
/// Holds the pairs of sets currently being compared, each with its depth along the path. A pair
/// that's compared again further down is assumed equal. Comparisons that finish are recorded, so
/// that shared sub-sets are compared once per call rather than once per path.
#[derive(Debug, Default)]
pub(crate) struct PairPath {
    /// Pairs being compared, with their depth.
    path: HashMap<(SetId, SetId), usize>,
    /// Outcomes of finished comparisons.
    settled: HashMap<(SetId, SetId), bool>,
    /// Shallowest depth of a pair assumed equal within the current comparison.
    assumed: usize,
}

impl PairPath {
    /// Initializes an empty guard.
    pub fn new() -> Self {
        Self {
            assumed: usize::MAX,
            ..Self::default()
        }
    }

    /// Runs the comparison `f` for a pair of sets.
    ///
    /// Returns `true` without running `f` if the pair is already being compared, and the recorded
    /// outcome if the pair was compared before.
    pub fn compare<F: FnOnce(&mut Self) -> bool>(&mut self, key: (SetId, SetId), f: F) -> bool {
        if let Some(&res) = self.settled.get(&key) {
            return res;
        }
        if let Some(&depth) = self.path.get(&key) {
            trace!(fst = %key.0, snd = %key.1, "cycle found while comparing");
            self.assumed = self.assumed.min(depth);
            return true;
        }

        let depth = self.path.len();
        self.path.insert(key, depth);
        let outer = std::mem::replace(&mut self.assumed, usize::MAX);
        let res = f(self);
        self.path.remove(&key);

        // A mismatch holds regardless of assumptions. A match only holds on its own if every pair
        // assumed equal along the way was this one or a descendant.
        if !res || self.assumed >= depth {
            self.settled.insert(key, res);
        }
        self.assumed = self.assumed.min(outer);
        res
    }
}

// -------------------- Rank -------------------- //

/// The nesting depth of a value.
///
/// Every non-set has rank zero. A set has rank one more than the largest rank among its set
/// members, or rank one if it has none. Sets that hereditarily contain themselves have
/// [`Rank::Unbounded`] rank.
///
/// Ranks are ordered, with [`Rank::Unbounded`] above every finite rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// A finite rank.
    Finite(usize),
    /// The rank of a set with cyclic membership.
    Unbounded,
}

impl Rank {
    /// The rank of a set whose largest ranked set member has this rank.
    #[must_use]
    pub fn succ(self) -> Self {
        match self {
            Self::Finite(n) => Self::Finite(n + 1),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Whether the rank is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_char('∞'),
        }
    }
}

// -------------------- Deep copy -------------------- //

/// Copies a value, replacing every set reachable from it by a fresh copy.
///
/// The map from original identities to copies ensures that shared sets are copied once, and that
/// cycles are reproduced rather than followed forever. Copies get the capability `cap`, or keep
/// that of their original if `None`.
pub(crate) fn deep_copy(
    value: &Value,
    cap: Option<Capability>,
    copies: &mut HashMap<SetId, Set>,
) -> Value {
    match value {
        Value::Scalar(_) => value.clone(),
        Value::List(list) => Value::List(list.iter().map(|v| deep_copy(v, cap, copies)).collect()),
        Value::Set(set) => Value::Set(deep_copy_set(set, cap, copies)),
    }
}

/// Copies a set, replacing every set reachable from it by a fresh copy.
///
/// See [`deep_copy`].
pub(crate) fn deep_copy_set(
    set: &Set,
    cap: Option<Capability>,
    copies: &mut HashMap<SetId, Set>,
) -> Set {
    if let Some(copy) = copies.get(&set.id()) {
        return copy.clone();
    }

    let copy = Set::with_capability(Capability::Mutable);
    copies.insert(set.id(), copy.clone());

    // A copy preserves structure, so distinct members stay distinct.
    for member in set {
        let member = deep_copy(&member, cap, copies);
        copy.push_unchecked(member);
    }

    copy.set_derived_capability(cap.unwrap_or(set.capability()));
    copy
}

#[cfg(test)]
mod utils {
    use super::*;

    #[test]
    fn fresh_ids() {
        let a = SetId::fresh();
        let b = SetId::fresh();
        assert!(a < b);
        assert_eq!(a.to_string(), format!("#{}", a.get()));
    }

    #[test]
    fn visited() {
        let mut guard = Visited::new();
        assert!(guard.enter(1));
        assert!(guard.enter(2));
        assert!(!guard.enter(1));
    }

    #[test]
    fn path() {
        let mut path = Path::new();
        let depth = path.descend(1, 0, |path| {
            assert!(path.contains(&1));
            path.descend(1, 10, |_| 20)
        });

        assert_eq!(depth, 10);
        assert!(!path.contains(&1));
    }

    #[test]
    fn pair_path() {
        let (a, b, c) = (SetId::fresh(), SetId::fresh(), SetId::fresh());
        let mut path = PairPath::new();

        assert!(path.compare((a, b), |path| {
            path.compare((c, b), |path| path.compare((a, b), |_| false))
        }));

        // The outer match is kept. The inner one rested on the outer pair.
        assert!(path.compare((a, b), |_| false));
        assert!(!path.compare((c, b), |_| false));
        assert!(!path.compare((c, b), |_| true));
    }

    #[test]
    fn rank_order() {
        assert!(Rank::Finite(0) < Rank::Finite(7));
        assert!(Rank::Finite(usize::MAX) < Rank::Unbounded);
        assert_eq!(Rank::Finite(2).succ(), Rank::Finite(3));
        assert_eq!(Rank::Unbounded.succ(), Rank::Unbounded);
        assert_eq!(Rank::Unbounded.to_string(), "∞");
    }

    #[test]
    fn deep_copy_shares() {
        let inner = crate::set![1];
        let outer = crate::set![inner.clone(), Value::List(vec![Value::Set(inner.clone())].into())];

        let copy = deep_copy_set(&outer, None, &mut HashMap::new());
        assert_eq!(copy, outer);
        assert_ne!(copy.id(), outer.id());

        // Both occurrences of `inner` become the same copy.
        let mut ids = Vec::new();
        for member in &copy {
            match member {
                Value::Set(set) => ids.push(set.id()),
                Value::List(list) => match &list[0] {
                    Value::Set(set) => ids.push(set.id()),
                    _ => unreachable!(),
                },
                Value::Scalar(_) => unreachable!(),
            }
        }

        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
        assert_ne!(ids[0], inner.id());
    }
}
