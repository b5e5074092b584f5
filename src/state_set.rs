//! Sets of states over a fixed universe.
//!
//! A [`StateSet`] pairs a [`BitSet`] with the [`Universe`] it indexes. Every
//! binary operation checks that both operands share the same universe and
//! panics otherwise: mixing sets of different graphs is a programming error,
//! not a recoverable condition.
//!
//! ```
//! use mucalc_rs::lts::Lts;
//! use mucalc_rs::state_set::StateSet;
//! use mucalc_rs::types::StateId;
//!
//! let lts = Lts::builder(4).build().unwrap();
//! let mut evens = StateSet::none(lts.universe());
//! evens.insert(StateId::new(0));
//! evens.insert(StateId::new(2));
//!
//! let odds = !&evens;
//! assert_eq!(odds.iter().map(|s| s.index()).collect::<Vec<_>>(), vec![1, 3]);
//! assert!(evens.is_subset(&StateSet::all(lts.universe())));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Sub};

use crate::bitset::{BitSet, BitSetIter};
use crate::lts::{State, Universe};
use crate::types::StateId;

/// A subset of a universe of states.
#[derive(Clone)]
pub struct StateSet {
    universe: Universe,
    bits: BitSet,
}

impl StateSet {
    /// The full set: every state of the universe.
    pub fn all(universe: &Universe) -> Self {
        Self {
            universe: universe.clone(),
            bits: BitSet::full(universe.len()),
        }
    }

    /// The empty set.
    pub fn none(universe: &Universe) -> Self {
        Self {
            universe: universe.clone(),
            bits: BitSet::new(universe.len()),
        }
    }

    /// Builds a set from state ids.
    pub fn from_states(universe: &Universe, states: impl IntoIterator<Item = StateId>) -> Self {
        let mut set = Self::none(universe);
        for s in states {
            set.insert(s);
        }
        set
    }

    /// Convenience for tests and tools: builds a set from raw indices.
    pub fn from_indices(universe: &Universe, indices: impl IntoIterator<Item = usize>) -> Self {
        Self::from_states(universe, indices.into_iter().map(StateId::new))
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    fn check_universe(&self, other: &StateSet) {
        assert!(
            self.universe.same_as(&other.universe),
            "state sets over different universes cannot be combined"
        );
    }

    /// Number of states in the set.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns true if the set is the whole universe.
    pub fn is_all(&self) -> bool {
        self.bits.is_full()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state.index())
    }

    /// Adds a state. Returns true if it was not already present.
    pub fn insert(&mut self, state: StateId) -> bool {
        self.bits.insert(state.index())
    }

    /// Removes a state. Returns true if it was present.
    pub fn remove(&mut self, state: StateId) -> bool {
        self.bits.remove(state.index())
    }

    pub fn union_with(&mut self, other: &StateSet) {
        self.check_universe(other);
        self.bits.union_with(&other.bits);
    }

    pub fn intersect_with(&mut self, other: &StateSet) {
        self.check_universe(other);
        self.bits.intersect_with(&other.bits);
    }

    pub fn difference_with(&mut self, other: &StateSet) {
        self.check_universe(other);
        self.bits.difference_with(&other.bits);
    }

    /// Complements the set within its universe.
    pub fn negate(&mut self) {
        self.bits.complement();
    }

    /// Resets to the empty set.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Resets to the full universe.
    pub fn fill(&mut self) {
        self.bits.fill();
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.check_universe(other);
        self.bits.is_subset(&other.bits)
    }

    pub fn is_superset(&self, other: &StateSet) -> bool {
        other.is_subset(self)
    }

    /// Member states in ascending index order. Every call starts a fresh iterator.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.bits.iter() }
    }

    /// Member states as [`State`] references, in ascending index order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.iter().map(move |s| self.universe.state(s))
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.check_universe(other);
        self.bits == other.bits
    }
}

impl Eq for StateSet {}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.index())).finish()
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, s) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s.index())?;
        }
        write!(f, "}}")
    }
}

/// Ascending iterator over the members of a [`StateSet`].
pub struct Iter<'a> {
    inner: BitSetIter<'a>,
}

impl Iterator for Iter<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(StateId::new)
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for &StateSet {
    type Output = StateSet;

    fn bitor(self, rhs: Self) -> StateSet {
        let mut res = self.clone();
        res.union_with(rhs);
        res
    }
}

impl BitAnd for &StateSet {
    type Output = StateSet;

    fn bitand(self, rhs: Self) -> StateSet {
        let mut res = self.clone();
        res.intersect_with(rhs);
        res
    }
}

impl Sub for &StateSet {
    type Output = StateSet;

    fn sub(self, rhs: Self) -> StateSet {
        let mut res = self.clone();
        res.difference_with(rhs);
        res
    }
}

impl Not for &StateSet {
    type Output = StateSet;

    fn not(self) -> StateSet {
        let mut res = self.clone();
        res.negate();
        res
    }
}
