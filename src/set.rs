//! Sets with structural equality [`Set`].

use crate::{
    prelude::*,
    utils::{deep_copy_set, PairPath},
};
use indexmap::IndexSet;
use std::cell::{Cell, Ref, RefCell, RefMut};

// -------------------- Storage -------------------- //

/// The two partitions of a set.
///
/// ## Invariants
///
/// No two members across both partitions are equal. Scalars are only ever stored in `scalars`,
/// lists and sets only ever in `structs`.
#[derive(Clone, Default)]
pub(crate) struct Storage {
    /// Scalar members, found by hashing.
    scalars: IndexSet<Scalar>,
    /// Structural members, in insertion order.
    structs: Vec<Value>,
}

impl Storage {
    /// Number of members.
    fn len(&self) -> usize {
        self.scalars.len() + self.structs.len()
    }

    /// The member at a given position: scalars first, then structural members.
    fn get(&self, index: usize) -> Option<Value> {
        let n = self.scalars.len();
        if index < n {
            self.scalars.get_index(index).cloned().map(Value::Scalar)
        } else {
            self.structs.get(index - n).cloned()
        }
    }

    /// Stores a member in its partition without checking for duplicates.
    fn push(&mut self, value: Value) {
        match value {
            Value::Scalar(scalar) => {
                self.scalars.insert(scalar);
            }
            other => self.structs.push(other),
        }
    }
}

// -------------------- Capability -------------------- //

/// Whether a set may be mutated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Mutators are allowed.
    #[default]
    Mutable,
    /// Mutators fail with [`SetError::ImmutabilityViolation`]. Can be undone by
    /// [`Set::unfreeze`].
    Frozen,
    /// Frozen for good. Only the shared empty set has this capability.
    Constant,
}

impl Capability {
    /// Whether mutators are allowed.
    #[must_use]
    pub const fn is_mutable(self) -> bool {
        matches!(self, Self::Mutable)
    }

    /// The capability a newly built set inherits from the set it was derived from.
    const fn derived(self) -> Self {
        match self {
            Self::Mutable => Self::Mutable,
            Self::Frozen | Self::Constant => Self::Frozen,
        }
    }
}

// -------------------- Set -------------------- //

/// The shared state behind a [`Set`] handle.
struct Node {
    /// Identity token.
    id: SetId,
    /// Whether mutators are allowed.
    cap: Cell<Capability>,
    /// Members.
    data: RefCell<Storage>,
}

/// A set whose members are deduplicated by structural equality.
///
/// A [`Set`] is a handle: cloning it yields another reference to the same set, and mutators take
/// `&self`. Every derived operation (union, power set, map...) returns a new set and leaves its
/// inputs alone.
///
/// ## Invariants
///
/// No two members of a set are equal. A set never directly contains itself, though it may contain
/// itself through other sets.
///
/// ## Cycles
///
/// Sets that contain each other keep each other alive. Call [`Set::teardown`] to break the cycle
/// once such sets are no longer needed.
#[derive(Clone)]
pub struct Set(Rc<Node>);

thread_local! {
    /// The shared empty set.
    static EMPTY: Set = Set::with_capability(Capability::Constant);
}

impl Default for Set {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Into<Value>> FromIterator<V> for Set {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = Value;
    type IntoIter = Members;

    fn into_iter(self) -> Members {
        self.iter()
    }
}

impl Set {
    /// Initializes an empty mutable set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capability(Capability::Mutable)
    }

    /// Initializes an empty set with the given capability.
    #[must_use]
    pub fn with_capability(cap: Capability) -> Self {
        Self(Rc::new(Node {
            id: SetId::fresh(),
            cap: Cell::new(cap),
            data: RefCell::new(Storage::default()),
        }))
    }

    /// Initializes a mutable set from some values. Duplicates collapse.
    pub fn from_values<I: IntoIterator<Item = V>, V: Into<Value>>(iter: I) -> Self {
        let set = Self::new();
        for value in iter {
            set.put(value.into());
        }
        set
    }

    /// The shared empty set.
    ///
    /// Every call on a given thread returns a handle to the same set. Its capability is
    /// [`Capability::Constant`], so it can never be mutated.
    #[must_use]
    pub fn empty_set() -> Self {
        EMPTY.with(Clone::clone)
    }

    /// The identity token of the set.
    #[must_use]
    pub fn id(&self) -> SetId {
        self.0.id
    }

    /// Whether both handles refer to the same set.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Borrows the storage.
    fn storage(&self) -> Ref<'_, Storage> {
        self.0.data.borrow()
    }

    /// Mutably borrows the storage.
    ///
    /// No borrow of the storage outlives the method that takes it, so this never panics.
    fn storage_mut(&self) -> RefMut<'_, Storage> {
        self.0.data.borrow_mut()
    }

    // -------------------- Capability -------------------- //

    /// The current capability of the set.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.0.cap.get()
    }

    /// Whether mutators currently fail on this set.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        !self.capability().is_mutable()
    }

    /// Forbids mutation of the set, in place.
    pub fn freeze(&self) {
        if self.capability() == Capability::Mutable {
            debug!(set = %self.id(), "freezing set");
            self.0.cap.set(Capability::Frozen);
        }
    }

    /// Allows mutation of the set again, in place.
    ///
    /// ## Errors
    ///
    /// The shared empty set can't be unfrozen.
    pub fn unfreeze(&self) -> Result<()> {
        match self.capability() {
            Capability::Constant => Err(SetError::ImmutabilityViolation("unfreeze")),
            Capability::Frozen => {
                debug!(set = %self.id(), "unfreezing set");
                self.0.cap.set(Capability::Mutable);
                Ok(())
            }
            Capability::Mutable => Ok(()),
        }
    }

    /// Sets the capability of a set built by a derived operation.
    pub(crate) fn set_derived_capability(&self, cap: Capability) {
        self.0.cap.set(cap.derived());
    }

    /// Gives a set built by a derived operation the capability of the set it came from.
    pub(crate) fn inherit(self, from: &Self) -> Self {
        self.set_derived_capability(from.capability());
        self
    }

    /// Fails if the set is frozen.
    fn check_mutable(&self, op: &'static str) -> Result<()> {
        if self.is_frozen() {
            Err(SetError::ImmutabilityViolation(op))
        } else {
            Ok(())
        }
    }

    // -------------------- Basic methods -------------------- //

    /// Set cardinality.
    #[must_use]
    pub fn card(&self) -> usize {
        self.storage().len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.card() == 0
    }

    /// Iterates over the members of the set.
    ///
    /// Scalars come first, in no particular order, followed by the structural members in insertion
    /// order. Mutating the set while iterating over it won't panic, but might skip or repeat
    /// members.
    #[must_use]
    pub fn iter(&self) -> Members {
        Members {
            set: self.clone(),
            index: 0,
        }
    }

    /// The member at a given position within [`Set::iter`].
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.storage().get(index)
    }

    /// Integer-indexed view: the members of the set along with their positions.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Value)> {
        self.iter().enumerate()
    }

    /// Key-indexed view: every member of the set, mapped to `true`.
    pub fn keys(&self) -> impl Iterator<Item = (Value, bool)> {
        self.iter().map(|value| (value, true))
    }

    /// Collects the members into a vector, in the order of [`Set::iter`].
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Membership ∈, by structural equality.
    ///
    /// Scalars are found in constant time. Lists and sets are compared against every structural
    /// member.
    #[must_use]
    pub fn has(&self, value: &Value) -> bool {
        self.has_guarded(value, &mut PairPath::new())
    }

    /// Membership, reusing the pairs of sets being compared by some larger traversal.
    pub(crate) fn has_guarded(&self, value: &Value, path: &mut PairPath) -> bool {
        let data = self.storage();
        match value {
            Value::Scalar(scalar) => data.scalars.contains(scalar),
            Value::Set(set) => {
                // Identity is much cheaper than equality.
                data.structs
                    .iter()
                    .any(|member| matches!(member, Value::Set(s) if s.ptr_eq(set)))
                    || data.structs.iter().any(|member| member.eq_guarded(value, path))
            }
            Value::List(_) => data.structs.iter().any(|member| member.eq_guarded(value, path)),
        }
    }

    // -------------------- Mutators -------------------- //

    /// Stores a value unless it's already a member, skipping every check on the receiver.
    ///
    /// Used for sets still being built, which nobody else can reference.
    pub(crate) fn put(&self, value: Value) -> bool {
        if self.has(&value) {
            return false;
        }
        self.storage_mut().push(value);
        true
    }

    /// Stores a value that's known not to be a member.
    pub(crate) fn push_unchecked(&self, value: Value) {
        self.storage_mut().push(value);
    }

    /// Adds a single value to the set. Returns whether it was not a member before.
    ///
    /// ## Errors
    ///
    /// Fails if the set is frozen, or if the value is the set itself.
    pub fn insert<V: Into<Value>>(&self, value: V) -> Result<bool> {
        self.check_mutable("add to")?;
        let value = value.into();

        if let Value::Set(set) = &value {
            if set.ptr_eq(self) {
                return Err(SetError::SelfMembership);
            }
        }

        let added = self.put(value);
        if !added {
            trace!(set = %self.id(), "skipping duplicate member");
        }
        Ok(added)
    }

    /// Adds some values to the set. Values already in the set are skipped.
    ///
    /// ## Errors
    ///
    /// See [`Set::insert`]. Values before the failing one remain added.
    pub fn add<I: IntoIterator<Item = V>, V: Into<Value>>(&self, iter: I) -> Result<()> {
        for value in iter {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Adds some values from a sequence with holes. Holes are skipped.
    ///
    /// ## Errors
    ///
    /// See [`Set::insert`].
    pub fn add_sparse<I: IntoIterator<Item = Option<V>>, V: Into<Value>>(
        &self,
        iter: I,
    ) -> Result<()> {
        for (i, value) in iter.into_iter().enumerate() {
            match value {
                Some(value) => {
                    self.insert(value)?;
                }
                None => trace!(set = %self.id(), index = i, "skipping hole"),
            }
        }
        Ok(())
    }

    /// Removes a single value from the set. Returns whether it was a member.
    ///
    /// ## Errors
    ///
    /// Fails if the set is frozen.
    pub fn discard<V: Into<Value>>(&self, value: V) -> Result<bool> {
        self.check_mutable("remove from")?;

        match value.into() {
            Value::Scalar(scalar) => Ok(self.storage_mut().scalars.swap_remove(&scalar)),
            value => {
                // At most one member can match.
                let mut path = PairPath::new();
                let data = self.storage();
                let pos = data
                    .structs
                    .iter()
                    .position(|member| member.eq_guarded(&value, &mut path));
                drop(data);

                if let Some(pos) = pos {
                    self.storage_mut().structs.remove(pos);
                }
                Ok(pos.is_some())
            }
        }
    }

    /// Removes some values from the set. Values not in the set are skipped.
    ///
    /// ## Errors
    ///
    /// Fails if the set is frozen.
    pub fn remove<I: IntoIterator<Item = V>, V: Into<Value>>(&self, iter: I) -> Result<()> {
        self.check_mutable("remove from")?;
        for value in iter {
            self.discard(value)?;
        }
        Ok(())
    }

    /// Removes some values from a sequence with holes. Holes are skipped.
    ///
    /// ## Errors
    ///
    /// Fails if the set is frozen.
    pub fn remove_sparse<I: IntoIterator<Item = Option<V>>, V: Into<Value>>(
        &self,
        iter: I,
    ) -> Result<()> {
        self.remove(iter.into_iter().flatten())
    }

    /// Removes every member from the set.
    ///
    /// ## Errors
    ///
    /// Fails if the set is frozen.
    pub fn clear(&self) -> Result<()> {
        self.check_mutable("clear")?;
        *self.storage_mut() = Storage::default();
        Ok(())
    }

    /// Empties every set reachable from this one, regardless of capability.
    ///
    /// Sets that contain each other are reference-counted in a cycle, and are never freed on their
    /// own. Tearing one of them down releases the whole cycle.
    pub fn teardown(&self) {
        let mut seen = Visited::new();
        let mut stack = vec![self.clone()];
        let mut found = Vec::new();

        // Collect every reachable set before emptying any of them.
        while let Some(set) = stack.pop() {
            if !seen.enter(set.id()) {
                continue;
            }

            for member in &set {
                match member {
                    Value::Set(inner) => stack.push(inner),
                    Value::List(list) => {
                        stack.extend(list.iter().filter_map(|v| v.as_set_ref().cloned()));
                    }
                    Value::Scalar(_) => {}
                }
            }
            found.push(set);
        }

        debug!(set = %self.id(), count = found.len(), "tearing down sets");
        for set in found {
            *set.storage_mut() = Storage::default();
        }
    }

    // -------------------- Copies -------------------- //

    /// A new set with the same members and capability. Member sets are shared, not copied.
    #[must_use]
    pub fn copy(&self) -> Self {
        let copy = Self(Rc::new(Node {
            id: SetId::fresh(),
            cap: Cell::new(Capability::Mutable),
            data: RefCell::new(self.storage().clone()),
        }));
        copy.inherit(self)
    }

    /// A new set with copies of every set reachable from this one.
    ///
    /// Sets reachable along several paths are copied once, and cycles are reproduced. Every copy
    /// keeps the capability of its original.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        deep_copy_set(self, None, &mut HashMap::new())
    }

    /// A frozen deep copy of the set.
    #[must_use]
    pub fn to_frozen(&self) -> Self {
        deep_copy_set(self, Some(Capability::Frozen), &mut HashMap::new())
    }

    /// A mutable deep copy of the set.
    #[must_use]
    pub fn to_mutable(&self) -> Self {
        deep_copy_set(self, Some(Capability::Mutable), &mut HashMap::new())
    }

    // -------------------- Relations -------------------- //

    /// Structural equality, reusing the pairs of sets being compared by some larger traversal.
    ///
    /// A pair that's already being compared further up is assumed equal. If it isn't, the
    /// comparison further up finds out.
    pub(crate) fn eq_guarded(&self, other: &Self, path: &mut PairPath) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.card() != other.card() {
            return false;
        }

        path.compare((self.id(), other.id()), |path| self.subset_guarded(other, path))
    }

    /// Subset relation, reusing the pairs of sets being compared by some larger traversal.
    pub(crate) fn subset_guarded(&self, other: &Self, path: &mut PairPath) -> bool {
        self.iter().all(|member| other.has_guarded(&member, path))
    }

    /// Set equality. Sets are equal when they have the same members.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.eq_guarded(other, &mut PairPath::new())
    }

    /// Subset relation ⊆.
    #[must_use]
    pub fn subset_of(&self, other: &Self) -> bool {
        self.subset_guarded(other, &mut PairPath::new())
    }

    /// Strict subset relation ⊂.
    #[must_use]
    pub fn strict_subset_of(&self, other: &Self) -> bool {
        self.card() < other.card() && self.subset_of(other)
    }

    /// Superset relation ⊇.
    #[must_use]
    pub fn superset_of(&self, other: &Self) -> bool {
        other.subset_of(self)
    }

    /// Strict superset relation ⊃.
    #[must_use]
    pub fn strict_superset_of(&self, other: &Self) -> bool {
        other.strict_subset_of(self)
    }

    // -------------------- Transformations -------------------- //

    /// Applies a function to every member. Results that coincide collapse into one member.
    ///
    /// The result inherits the capability of `self`.
    #[must_use]
    pub fn map<F: FnMut(Value) -> Value>(&self, mut f: F) -> Self {
        // `f` may inspect or mutate `self`, so we work on a snapshot.
        let res = Self::new();
        for member in self.to_vec() {
            res.put(f(member));
        }
        res.inherit(self)
    }

    /// The members satisfying a predicate.
    ///
    /// The result inherits the capability of `self`.
    #[must_use]
    pub fn filter<P: FnMut(&Value) -> bool>(&self, mut pred: P) -> Self {
        let res = Self::new();
        for member in self.to_vec() {
            if pred(&member) {
                res.push_unchecked(member);
            }
        }
        res.inherit(self)
    }

    // -------------------- Rendering -------------------- //

    /// Writes the set in roster notation, threading the sets along the current rendering path.
    ///
    /// A set found again within itself is written as a placeholder holding its identity.
    pub(crate) fn render(&self, f: &mut Formatter<'_>, path: &mut Path) -> FmtResult {
        if path.contains(&self.id()) {
            trace!(set = %self.id(), "cycle found while rendering");
            return write!(f, "{{...}}{}", self.id());
        }

        path.descend(self.id(), Ok(()), |path| {
            f.write_char('{')?;
            for (i, member) in self.iter().enumerate() {
                if i != 0 {
                    f.write_str(", ")?;
                }
                member.render(f, path)?;
            }
            f.write_char('}')
        })
    }
}

/// Displays a set in roster notation, like `{1, "a", {2, 3}}`.
///
/// A set that contains itself through other sets renders its inner occurrences as `{...}#id`,
/// where `#id` is its [`SetId`].
impl Display for Set {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.render(f, &mut Path::new())
    }
}

impl Debug for Set {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Set{}{self}", self.id())
    }
}

// -------------------- Iterators -------------------- //

/// Iterator over the members of a [`Set`]. See [`Set::iter`].
///
/// The iterator holds a handle to the set, and borrows its storage only for the duration of each
/// call to [`Iterator::next`].
#[derive(Clone)]
pub struct Members {
    /// The set being iterated.
    set: Set,
    /// The position of the next member.
    index: usize,
}

impl Iterator for Members {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let next = self.set.get(self.index)?;
        self.index += 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.set.card().saturating_sub(self.index);
        (len, Some(len))
    }
}

impl ExactSizeIterator for Members {}
