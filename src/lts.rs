//! Labeled transition systems.
//!
//! An [`Lts`] is an immutable graph: a [`Universe`] of states indexed densely by
//! [`StateId`], plus a flat list of labeled [`Transition`]s. Each state keeps
//! the positions of its outgoing and incoming transitions, so the evaluator can
//! compute modal preimages by walking incoming edges only.
//!
//! Graphs are built either through [`LtsBuilder`] or by reading the Aldebaran
//! format (see [`crate::aldebaran`]).
//!
//! ```
//! use mucalc_rs::lts::Lts;
//!
//! let lts = Lts::builder(2)
//!     .transition(0, "a", 1)
//!     .transition(1, "b", 1)
//!     .build()
//!     .unwrap();
//! assert_eq!(lts.num_states(), 2);
//! assert_eq!(lts.num_transitions(), 2);
//! ```

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::types::{Label, StateId};

/// Errors raised while building an LTS programmatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LtsError {
    #[error("transition {from} -> {to} refers to a state outside 0..{num_states}")]
    StateOutOfRange { from: usize, to: usize, num_states: usize },

    #[error("initial state {initial} is outside 0..{num_states}")]
    InitialOutOfRange { initial: usize, num_states: usize },
}

/// A state of the transition system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    name: String,
    outgoing: Vec<usize>,
    incoming: Vec<usize>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Display name; defaults to the decimal index.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positions (in [`Lts::transitions`]) of the transitions leaving this state.
    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }

    /// Positions (in [`Lts::transitions`]) of the transitions entering this state.
    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }
}

/// A labeled edge `from -label-> to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: StateId,
    pub label: Label,
    pub to: StateId,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -{}-> {}", self.from, self.label, self.to)
    }
}

/// Shared handle on the ordered state array.
///
/// Cloning a `Universe` is cheap and yields the *same* universe: identity is
/// decided by pointer, not by contents. State sets built over two separately
/// constructed universes are never compatible, even if the graphs are equal.
#[derive(Clone)]
pub struct Universe {
    states: Arc<[State]>,
}

impl Universe {
    fn new(states: Vec<State>) -> Self {
        Self { states: states.into() }
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns true if both handles point at the same state array.
    pub fn same_as(&self, other: &Universe) -> bool {
        Arc::ptr_eq(&self.states, &other.states)
    }
}

impl Index<StateId> for Universe {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        self.state(id)
    }
}

impl fmt::Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Universe")
            .field("len", &self.len())
            .field("ptr", &Arc::as_ptr(&self.states))
            .finish()
    }
}

/// An immutable labeled transition system.
#[derive(Debug, Clone)]
pub struct Lts {
    universe: Universe,
    transitions: Vec<Transition>,
    initial: StateId,
}

impl Lts {
    /// Starts building an LTS with `num_states` states and initial state 0.
    pub fn builder(num_states: usize) -> LtsBuilder {
        LtsBuilder::new(num_states)
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn num_states(&self) -> usize {
        self.universe.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// The designated initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> &State {
        self.universe.state(id)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.universe.states().iter()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions leaving `id`, in insertion order.
    pub fn outgoing(&self, id: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.state(id).outgoing.iter().map(move |&t| &self.transitions[t])
    }

    /// Transitions entering `id`, in insertion order.
    pub fn incoming(&self, id: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.state(id).incoming.iter().map(move |&t| &self.transitions[t])
    }

    /// Distinct labels occurring on transitions, sorted.
    pub fn labels(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.transitions.iter().map(|t| &t.label).collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// Incremental constructor for [`Lts`].
#[derive(Debug, Clone)]
pub struct LtsBuilder {
    num_states: usize,
    initial: usize,
    names: Vec<Option<String>>,
    transitions: Vec<(usize, Label, usize)>,
}

impl LtsBuilder {
    pub fn new(num_states: usize) -> Self {
        Self {
            num_states,
            initial: 0,
            names: vec![None; num_states],
            transitions: Vec::new(),
        }
    }

    pub fn initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    /// Overrides the display name of a state. Out-of-range indices are ignored.
    pub fn name(mut self, state: usize, name: impl Into<String>) -> Self {
        if let Some(slot) = self.names.get_mut(state) {
            *slot = Some(name.into());
        }
        self
    }

    pub fn transition(mut self, from: usize, label: impl Into<Label>, to: usize) -> Self {
        self.add_transition(from, label, to);
        self
    }

    /// Non-consuming variant of [`LtsBuilder::transition`], for loaders.
    pub fn add_transition(&mut self, from: usize, label: impl Into<Label>, to: usize) {
        self.transitions.push((from, label.into(), to));
    }

    pub fn build(self) -> Result<Lts, LtsError> {
        let n = self.num_states;
        if self.initial >= n && n > 0 {
            return Err(LtsError::InitialOutOfRange {
                initial: self.initial,
                num_states: n,
            });
        }

        let mut states: Vec<State> = self
            .names
            .into_iter()
            .enumerate()
            .map(|(i, name)| State {
                id: StateId::new(i),
                name: name.unwrap_or_else(|| i.to_string()),
                outgoing: Vec::new(),
                incoming: Vec::new(),
            })
            .collect();

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for (from, label, to) in self.transitions {
            if from >= n || to >= n {
                return Err(LtsError::StateOutOfRange { from, to, num_states: n });
            }
            let pos = transitions.len();
            states[from].outgoing.push(pos);
            states[to].incoming.push(pos);
            transitions.push(Transition {
                from: StateId::new(from),
                label,
                to: StateId::new(to),
            });
        }

        debug!("build: {} states, {} transitions", n, transitions.len());

        Ok(Lts {
            universe: Universe::new(states),
            transitions,
            initial: StateId::new(self.initial),
        })
    }
}
