//! Conversions from sets into plain sequences.
//!
//! A [`Table`] is a recursive conversion of a set into nested sequences. Sequences live in an
//! arena and refer to each other by index, so a set reachable along several paths (or from
//! within itself) is converted once, and every occurrence refers to the same row.

use crate::prelude::*;

/// An entry within a row of a [`Table`].
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A member that isn't a set.
    Value(Value),
    /// A nested set, converted into the row with this index.
    Table(usize),
}

/// A set recursively converted into rows of entries. See [`Set::to_table`].
///
/// ## Invariants
///
/// Every row was converted from a set, and every [`Entry::Table`] index is in range. Row 0 is the
/// set the table was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// The converted sets.
    rows: Vec<Vec<Entry>>,
}

impl Table {
    /// The row for the set the table was built from.
    #[must_use]
    pub fn root(&self) -> &[Entry] {
        &self.rows[0]
    }

    /// The row with a given index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Entry]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// The number of rows, i.e. the number of distinct sets converted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false, as a table has at least its root row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds a row for a set, unless it's been converted already. Returns its index.
    fn convert(&mut self, set: &Set, index: &mut HashMap<SetId, usize>) -> usize {
        if let Some(&i) = index.get(&set.id()) {
            return i;
        }

        let i = self.rows.len();
        self.rows.push(Vec::new());
        index.insert(set.id(), i);

        let mut row = Vec::with_capacity(set.card());
        for member in set {
            row.push(match member {
                Value::Set(inner) => Entry::Table(self.convert(&inner, index)),
                other => Entry::Value(other),
            });
        }

        self.rows[i] = row;
        i
    }

    /// Rebuilds the sets the table was converted from.
    ///
    /// Each row becomes a single new mutable set, so shared sets stay shared and cycles are
    /// restored. Lists are kept as they were.
    #[must_use]
    pub fn to_set(&self) -> Set {
        let sets: Vec<Set> = self.rows.iter().map(|_| Set::new()).collect();

        // Rows were converted from sets, so their entries are distinct.
        for (row, set) in self.rows.iter().zip(&sets) {
            for entry in row {
                set.push_unchecked(match entry {
                    Entry::Value(value) => value.clone(),
                    Entry::Table(i) => Value::Set(sets[*i].clone()),
                });
            }
        }

        sets[0].clone()
    }
}

impl Set {
    /// Recursively converts the set into a [`Table`].
    ///
    /// Rows follow the order of [`Set::iter`]. Sets nested within lists are not converted.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table { rows: Vec::new() };
        table.convert(self, &mut HashMap::new());
        table
    }

    /// The members in the default order given by [`Value::total_cmp`].
    #[must_use]
    pub fn sorted(&self) -> Vec<Value> {
        self.sorted_by(Value::total_cmp)
    }

    /// The members, sorted by a comparator.
    #[must_use]
    pub fn sorted_by<F: FnMut(&Value, &Value) -> Ordering>(&self, cmp: F) -> Vec<Value> {
        let mut vec = self.to_vec();
        vec.sort_by(cmp);
        vec
    }
}
