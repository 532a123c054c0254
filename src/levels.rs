//! Algorithms that descend through nested sets: [rank](Set::rank), [levels](Set::at_level),
//! [flattening](Set::flatten), and the [power set](Set::power).
//!
//! Each of them allocates a fresh guard per top-level call, so that sets which contain themselves
//! through other sets don't send them into an infinite loop.

use crate::prelude::*;

/// Ranks already found by some traversal.
type Ranks = HashMap<SetId, Rank>;

impl Set {
    /// Rank, threading the sets along the current path and the ranks already found.
    ///
    /// A rank never depends on the path it was reached through, so every rank found is recorded.
    fn rank_guarded(&self, path: &mut Path, ranks: &mut Ranks) -> Rank {
        if let Some(&rank) = ranks.get(&self.id()) {
            return rank;
        }

        let rank = path.descend(self.id(), Rank::Unbounded, |path| {
            let mut max = Rank::Finite(0);
            for member in self {
                if let Value::Set(set) = member {
                    max = max.max(set.rank_guarded(path, ranks));
                    if max == Rank::Unbounded {
                        break;
                    }
                }
            }
            max.succ()
        });
        ranks.insert(self.id(), rank);
        rank
    }

    /// The [`Rank`] of the set: one more than the largest rank among its set members.
    ///
    /// The empty set has rank one. Sets that hereditarily contain themselves have unbounded rank.
    #[must_use]
    pub fn rank(&self) -> Rank {
        let rank = self.rank_guarded(&mut Path::new(), &mut Ranks::new());
        if rank == Rank::Unbounded {
            trace!(set = %self.id(), "unbounded rank");
        }
        rank
    }

    /// Adds the members of rank `n`, threading the sets already visited and the ranks found.
    fn of_rank_into(
        &self,
        n: usize,
        recursive: bool,
        res: &Set,
        seen: &mut Visited,
        ranks: &mut Ranks,
    ) {
        if !seen.enter(self.id()) {
            return;
        }

        for member in self {
            let rank = match &member {
                Value::Set(set) => set.rank_guarded(&mut Path::new(), ranks),
                _ => Rank::Finite(0),
            };
            if rank == Rank::Finite(n) {
                res.put(member.clone());
            }
            if recursive {
                if let Value::Set(set) = &member {
                    set.of_rank_into(n, true, res, seen, ranks);
                }
            }
        }
    }

    /// The members of rank `n`. If `recursive` is set, also includes the members of rank `n` of
    /// every set reachable from this one.
    ///
    /// Since every non-set has rank zero, `of_rank(0, true)` equals [`Set::flatten`]. The result
    /// inherits the capability of `self`.
    #[must_use]
    pub fn of_rank(&self, n: usize, recursive: bool) -> Set {
        let res = Set::new();
        self.of_rank_into(n, recursive, &res, &mut Visited::new(), &mut Ranks::new());
        res.inherit(self)
    }

    /// The values found after descending `n` times into nested sets.
    ///
    /// Level 1 consists of the members of the set itself. Level `k + 1` is the union of level `k`
    /// over every set member. Members that aren't sets don't contribute to deeper levels.
    ///
    /// The result inherits the capability of `self`.
    ///
    /// ## Errors
    ///
    /// Fails with [`SetError::PreconditionViolation`] if `n` is zero.
    pub fn at_level(&self, n: usize) -> Result<Set> {
        if n == 0 {
            return Err(SetError::PreconditionViolation("levels start at 1".to_owned()));
        }

        // Sets reached after each descent. Reaching the same set twice at some depth makes no
        // difference to the union, so we keep one handle per identity.
        let mut frontier = vec![self.clone()];
        for _ in 1..n {
            let mut seen = Visited::new();
            let mut next = Vec::new();
            for set in &frontier {
                for member in set {
                    if let Value::Set(inner) = member {
                        if seen.enter(inner.id()) {
                            next.push(inner);
                        }
                    }
                }
            }

            frontier = next;
        }

        let res = Set::new();
        for set in &frontier {
            for member in set {
                res.put(member);
            }
        }
        Ok(res.inherit(self))
    }

    /// Adds every non-set reachable from this set, threading the sets already visited.
    fn flatten_into(&self, res: &Set, seen: &mut Visited) {
        if !seen.enter(self.id()) {
            trace!(set = %self.id(), "set already flattened");
            return;
        }

        for member in self {
            match member {
                Value::Set(set) => set.flatten_into(res, seen),
                other => {
                    res.put(other);
                }
            }
        }
    }

    /// Every non-set reachable from this set, descending through nested sets without limit.
    ///
    /// The result inherits the capability of `self`.
    #[must_use]
    pub fn flatten(&self) -> Set {
        let res = Set::new();
        self.flatten_into(&res, &mut Visited::new());
        res.inherit(self)
    }

    /// Power set 𝒫(x), the set of all subsets.
    ///
    /// Subsets are built by doubling: starting from {Ø}, each member `v` adds `s ∪ {v}` for every
    /// subset `s` built so far. This takes time and memory proportional to 2ⁿ, so it's only
    /// practical for around 20 members or fewer. A warning is logged above
    /// [`Config::power_warn_threshold`](crate::config::Config).
    ///
    /// The result and each subset inherit the capability of `self`.
    #[must_use]
    pub fn power(&self) -> Set {
        let members = self.to_vec();
        let threshold = crate::config::get().power_warn_threshold;
        if members.len() > threshold {
            warn!(
                set = %self.id(),
                card = members.len(),
                threshold,
                "building a large power set"
            );
        }

        let mut subsets = vec![Set::new()];
        for member in members {
            for i in 0..subsets.len() {
                let subset = subsets[i].copy();
                // Members are distinct, so `member` can't already be in a subset.
                subset.push_unchecked(member.clone());
                subsets.push(subset);
            }
        }

        debug!(set = %self.id(), count = subsets.len(), "built power set");
        let res = Set::new();
        for subset in subsets {
            let subset = subset.inherit(self);
            res.push_unchecked(Value::Set(subset));
        }
        res.inherit(self)
    }
}
