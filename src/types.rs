//! Type-safe wrappers for states, binders and action labels.
//!
//! These newtypes keep the dense state index space, the environment slot space
//! and the action alphabet apart, so a binder slot can never be passed where a
//! state index is expected.

use std::fmt;

/// Dense index of a state in the universe (0-indexed).
///
/// # Invariants
///
/// - A `StateId` is always `< N`, where `N` is the size of the universe it was
///   created for.
/// - The index equals the position of the state in the universe array.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(usize);

impl StateId {
    /// Creates a state id from a raw index.
    pub fn new(index: usize) -> Self {
        StateId(index)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.0
    }
}

impl From<usize> for StateId {
    fn from(index: usize) -> Self {
        StateId(index)
    }
}

/// Environment slot of a fixed-point binder.
///
/// Slots are handed out in the order in which the parser encounters `mu`/`nu`
/// binders, so the outermost binder of a formula always gets slot 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BinderId(usize);

impl BinderId {
    /// Creates a binder id from a raw slot index.
    pub fn new(slot: usize) -> Self {
        BinderId(slot)
    }

    /// Returns the raw slot index.
    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for BinderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An action label on a transition or inside a modal operator.
///
/// The literal label `true` is a wildcard: it matches every other label, both
/// when it appears in `<true>`/`[true]` and when it appears on a transition.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label(String);

impl Label {
    /// The wildcard label text.
    pub const WILDCARD: &'static str = "true";

    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    /// The wildcard label, matching every action.
    pub fn any() -> Self {
        Label(Self::WILDCARD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    /// Returns true if the two labels are equal or either one is the wildcard.
    pub fn matches(&self, other: &Label) -> bool {
        self.is_wildcard() || other.is_wildcard() || self.0 == other.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label(name)
    }
}
