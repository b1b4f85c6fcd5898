//! This module provides the execution `History`: an index-addressable list of full
//! machine snapshots with a cursor, supporting backward and forward time travel without
//! re-execution.

use crate::tape::Tape;
use crate::types::{Action, Position, TuringMachineError};

/// A complete, independent copy of the machine at one point of execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tape: Tape,
    pub head: Position,
    pub state: String,
    /// The transition that produced this snapshot. `None` for a history root.
    pub action: Option<Action>,
}

impl Snapshot {
    pub fn root(tape: Tape, head: Position, state: impl Into<String>) -> Self {
        Self {
            tape,
            head,
            state: state.into(),
            action: None,
        }
    }
}

/// The snapshot log. Never empty: it always holds at least its root entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    pub fn new(root: Snapshot) -> Self {
        Self {
            entries: vec![root],
            cursor: 0,
        }
    }

    /// Discards every entry and starts over from `root`.
    pub fn reset(&mut self, root: Snapshot) {
        self.entries.clear();
        self.entries.push(root);
        self.cursor = 0;
    }

    /// Drops every entry after the cursor, pushes `snapshot` and moves the cursor onto it.
    ///
    /// This is the only way entries are added past the root.
    pub fn append(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
    }

    /// Moves the cursor to `index` and returns the snapshot there.
    pub fn seek(&mut self, index: usize) -> Result<&Snapshot, TuringMachineError> {
        if index >= self.entries.len() {
            return Err(TuringMachineError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = index;
        Ok(&self.entries[index])
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the cursor sits on the newest entry.
    pub fn at_end(&self) -> bool {
        self.cursor + 1 == self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}
