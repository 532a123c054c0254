//! General library tests.

#![cfg(test)]

use crate::{ops, prelude::*, set};
use concat_idents::concat_idents;
use proptest::prelude::*;

/// Creates analogous tests for mutable and frozen receivers.
macro_rules! test {
    ($($name: ident),*) => {
        $(
            concat_idents!(fn_name = mutable, $name {
                #[test]
                fn fn_name() {
                    Mutable::$name();
                }
            });

            concat_idents!(fn_name = frozen, $name {
                #[test]
                fn fn_name() {
                    Frozen::$name();
                }
            });
        )*
    };
}

/// Read-only operations, which must behave the same regardless of capability.
trait Suite {
    /// Capability given to every set in the suite.
    const CAPABILITY: Capability;

    /// A multitude of sets for general-purpose testing, no two of them equal.
    fn suite() -> Vec<Set> {
        let sets = [
            set![],
            set![set![]],
            set![1, 2, 3],
            set!["a", 1.5, true],
            set![1, set![2, set![3, 4], set![5]], set![6]],
            set![set![1, 2], set![1, 3], set![1, 2, 3, 4]],
            set![Value::from(vec![Value::from(1), Value::from(set![2])]), set![set![set![]]]],
        ];

        if Self::CAPABILITY != Capability::Mutable {
            for set in &sets {
                set.freeze();
            }
        }
        sets.into()
    }

    /// Test that our suite is well-formed.
    fn _suite() {
        for (i, set_1) in Self::suite().iter().enumerate() {
            for (j, set_2) in Self::suite().iter().enumerate() {
                assert_eq!(
                    i == j,
                    set_1 == set_2,
                    "set equality fail at {i}, {j}: {set_1} | {set_2}"
                );
            }
        }
    }

    /// Test [`Set::subset_of`] and friends.
    fn _order() {
        for set_1 in Self::suite() {
            assert!(set_1 <= set_1);
            assert!(!(set_1 < set_1));

            for set_2 in Self::suite() {
                assert_eq!(set_1 <= set_2 && set_2 <= set_1, set_1 == set_2);
                if set_1 == set_2 {
                    assert_eq!(set_1.card(), set_2.card());
                }
            }
        }
    }

    /// Test [`Set::copy`] and its relation to the original.
    fn _copy() {
        for set in Self::suite() {
            let copy = set.copy();
            assert_eq!(copy, set);
            assert_eq!(copy.is_frozen(), set.is_frozen());
            assert_ne!(copy.id(), set.id());
        }
    }

    /// Test [`Set::power`].
    fn _power() {
        for set in Self::suite() {
            let power = set.power();
            assert_eq!(power.card(), 1usize << set.card(), "power set fail: {set}");
            assert_eq!(power.is_frozen(), set.is_frozen());

            for subset in &power {
                assert!(subset.as_set().unwrap().subset_of(&set));
            }
        }
    }

    /// Test [`Set::to_vec`] round-trips.
    fn _roundtrip() {
        for set in Self::suite() {
            assert_eq!(Set::from_values(set.to_vec()), set);
            assert_eq!(set.to_table().to_set(), set);
        }
    }

    /// Test [`Set::to_string`] round-trips through the flat conversion.
    fn _display() {
        for set in Self::suite() {
            assert_eq!(set.to_string(), Set::from_values(set.to_vec()).to_string());
        }
    }

    /// Test [`ops::union`] and [`ops::intersection`] against subsets.
    fn _arithmetic() {
        for set_1 in Self::suite() {
            for set_2 in Self::suite() {
                let union = ops::union(&[&set_1, &set_2]).unwrap();
                let inter = ops::intersection(&[&set_1, &set_2]).unwrap();
                for set in [&set_1, &set_2] {
                    assert!(set <= &union, "union fail: {set} not a subset of {union}");
                    assert!(&inter <= set, "intersection fail: {inter} not a subset of {set}");
                }
                assert_eq!(union.is_frozen(), set_1.is_frozen());

                let diff = &set_1 ^ &set_2;
                assert_eq!(diff, &union - &inter);
                assert!(ops::disjoint(&[&diff, &inter]).unwrap());
            }
        }
    }

    /// Test [`Set::of_rank`] and [`Set::flatten`].
    fn _rank() {
        for set in Self::suite() {
            assert_eq!(set.of_rank(0, true), set.flatten());

            let Rank::Finite(rank) = set.rank() else {
                panic!("suite sets are acyclic");
            };
            assert!(set.of_rank(rank - 1, false).card() >= 1 || rank == 1);
            assert!(set.of_rank(rank, false).is_empty());
        }
    }
}

/// Suite for mutable sets.
struct Mutable;

impl Suite for Mutable {
    const CAPABILITY: Capability = Capability::Mutable;
}

/// Suite for frozen sets.
struct Frozen;

impl Suite for Frozen {
    const CAPABILITY: Capability = Capability::Frozen;
}

test!(_suite, _order, _copy, _power, _roundtrip, _display, _arithmetic, _rank);

// -------------------- Cycles -------------------- //

/// Builds a = {1, b}, b = {2, a}.
fn cycle() -> (Set, Set) {
    let a = set![1];
    let b = set![2, a.clone()];
    a.insert(b.clone()).unwrap();
    (a, b)
}

#[test]
fn cycles_terminate() {
    let (a, b) = cycle();
    let (c, _) = cycle();

    assert_eq!(a, c);
    assert_ne!(a, b);
    assert_eq!(a.rank(), Rank::Unbounded);
    assert_eq!(a.flatten(), set![1, 2]);
    assert!(a.to_string().contains(&format!("{{...}}{}", a.id())));
    assert!(a.has(&b.clone().into()));
    assert_eq!(a.of_rank(0, true), set![1, 2]);

    let copy = a.deep_copy();
    assert_eq!(copy, a);
    assert_eq!(copy.rank(), Rank::Unbounded);

    for set in [a, c, copy] {
        set.teardown();
    }
    assert!(b.is_empty());
}

#[test]
fn freeze_contract() {
    let s = set![1, set![2]];
    s.freeze();

    assert!(matches!(s.add([3]), Err(SetError::ImmutabilityViolation(_))));
    assert!(matches!(s.remove([1]), Err(SetError::ImmutabilityViolation(_))));
    assert!(matches!(s.clear(), Err(SetError::ImmutabilityViolation(_))));
    assert!(s.power().is_frozen());

    s.unfreeze().unwrap();
    assert_eq!(s, set![1, set![2]]);
    s.add([3]).unwrap();
    assert_eq!(s.card(), 3);
}

#[test]
fn shared_empty_set() {
    let empty = Set::empty_set();
    assert!(empty.ptr_eq(&Set::empty_set()));
    assert_eq!(empty, set![]);
    assert!(empty.power().is_frozen());
    assert_eq!(empty.power(), set![set![]]);
}

// -------------------- Sharing -------------------- //

/// Builds s₀ = Ø and sₖ₊₁ = {{sₖ, 1}, {sₖ, 2}}, where every path down reaches each sₖ.
fn shared_chain(depth: usize) -> Set {
    let mut s = set![];
    for _ in 0..depth {
        s = set![set![s.clone(), 1], set![s.clone(), 2]];
    }
    s
}

#[test]
fn shared_subsets_visited_once() {
    // s₂₂ reaches s₀ along 2²² distinct paths.
    let s = shared_chain(22);

    assert_eq!(s.rank(), Rank::Finite(45));
    assert_eq!(s.of_rank(0, true), set![1, 2]);
    assert_eq!(s.of_rank(44, true).card(), 2);
    assert_eq!(s.deep_copy(), s);
    assert_eq!(s.to_table().to_set(), s);
    assert_ne!(s, shared_chain(21));

    let t = shared_chain(22);
    assert_eq!(s, t);
    assert!(set![s.clone()].has(&t.into()));
}

// -------------------- Properties -------------------- //

/// Arbitrary values: small integers and strings, nested into sets and lists.
fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        (0i64..8).prop_map(Value::from),
        "[ab]".prop_map(Value::from),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            3 => prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|v| Value::Set(Set::from_values(v))),
            1 => prop::collection::vec(inner, 0..3).prop_map(Value::from),
        ]
    })
}

/// Arbitrary sets of arbitrary values.
fn any_set() -> impl Strategy<Value = Set> {
    prop::collection::vec(value(), 0..6).prop_map(Set::from_values)
}

proptest! {
    #[test]
    fn uniqueness(set in any_set(), values in prop::collection::vec(value(), 0..6)) {
        set.add(values.clone()).unwrap();
        let card = set.card();
        set.add(values).unwrap();
        prop_assert_eq!(set.card(), card);

        let members = set.to_vec();
        for (i, x) in members.iter().enumerate() {
            for y in &members[(i + 1)..] {
                prop_assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn antisymmetry(a in any_set(), b in any_set()) {
        prop_assert_eq!(a <= b && b <= a, a == b);
        prop_assert!(!(a < a));
        if a == b {
            prop_assert_eq!(a.card(), b.card());
        }
    }

    #[test]
    fn power_card(set in prop::collection::vec(value(), 0..5).prop_map(Set::from_values)) {
        let power = set.power();
        prop_assert_eq!(power.card(), 1usize << set.card());
        for subset in &power {
            prop_assert!(subset.as_set().unwrap() <= &set);
        }
    }

    #[test]
    fn roundtrip(set in any_set()) {
        prop_assert_eq!(Set::from_values(set.to_vec()), set.clone());
        prop_assert_eq!(set.to_table().to_set(), set.clone());
        prop_assert_eq!(set.deep_copy(), set);
    }

    #[test]
    fn remove_undoes_add(set in any_set(), v in value()) {
        let card = set.card();
        let had = set.has(&v);

        set.insert(v.clone()).unwrap();
        prop_assert!(set.has(&v));
        set.discard(v.clone()).unwrap();
        prop_assert!(!set.has(&v));
        prop_assert_eq!(set.card(), if had { card - 1 } else { card });
    }
}
