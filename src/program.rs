//! This module defines the static `Program` definition a machine is initialized from,
//! and the insertion-ordered `StateSet` used for declared and halting states.

use crate::table::TransitionTable;
use crate::types::Position;

/// A set of state names that remembers insertion order for deterministic listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet {
    names: Vec<String>,
}

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name` unless already present. Returns true if it was inserted.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Removes `name`, keeping the order of the remaining states.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for StateSet {
    /// Collects names, collapsing duplicates onto their first occurrence.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Represents a validated Turing Machine program.
///
/// A program is built once, at load time, and never mutated afterwards. Edits apply to
/// the live engine, and `reset()` returns to this definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Declared states, in authoring order.
    pub states: StateSet,
    /// The state the machine starts in.
    pub initial_state: String,
    /// States which stop execution once entered.
    pub halt_states: StateSet,
    pub transitions: TransitionTable,
    /// Initial tape contents, dense from `tape_offset`.
    pub initial_tape: String,
    /// Position of the first character of `initial_tape`.
    pub tape_offset: Position,
    /// Initial head position.
    pub start_position: Position,
}

impl Program {
    /// Creates a program with an empty tape and the head at position 0.
    pub fn new(
        states: StateSet,
        initial_state: impl Into<String>,
        transitions: TransitionTable,
    ) -> Self {
        Self {
            states,
            initial_state: initial_state.into(),
            halt_states: StateSet::new(),
            transitions,
            initial_tape: String::new(),
            tape_offset: 0,
            start_position: 0,
        }
    }

    pub fn with_halt_states(mut self, halt_states: StateSet) -> Self {
        self.halt_states = halt_states;
        self
    }

    pub fn with_tape(mut self, initial_tape: impl Into<String>, start_position: Position) -> Self {
        self.initial_tape = initial_tape.into();
        self.start_position = start_position;
        self
    }

    pub fn is_halt_state(&self, state: &str) -> bool {
        self.halt_states.contains(state)
    }
}
