//! This module defines the sparse, bidirectionally unbounded `Tape`.
//!
//! Only written cells are stored. Writing the blank symbol removes the cell, so an
//! explicitly blanked cell and a never-visited one are indistinguishable.

use crate::types::{Position, Symbol, BLANK_SYMBOL};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: HashMap<Position, Symbol>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tape from a dense string whose first character lands at `offset`.
    /// Blank symbols in `input` leave their cell unset, and characters that would land past
    /// the last position are dropped.
    pub fn from_input(input: &str, offset: Position) -> Self {
        let mut tape = Self::new();
        for (i, symbol) in input.chars().enumerate() {
            match offset.checked_add(i as Position) {
                Some(position) => tape.write(position, symbol),
                None => break,
            }
        }
        tape
    }

    /// Returns the symbol at `position`, or the blank symbol if the cell was never written.
    pub fn read(&self, position: Position) -> Symbol {
        self.cells.get(&position).copied().unwrap_or(BLANK_SYMBOL)
    }

    pub fn write(&mut self, position: Position, symbol: Symbol) {
        if symbol == BLANK_SYMBOL {
            self.cells.remove(&position);
        } else {
            self.cells.insert(position, symbol);
        }
    }

    /// Returns the symbols for every position in `range`, blanks included.
    pub fn window(&self, range: Range<Position>) -> Vec<Symbol> {
        range.map(|position| self.read(position)).collect()
    }

    /// The smallest inclusive range covering every non-blank cell, if any.
    pub fn span(&self) -> Option<(Position, Position)> {
        let min = self.cells.keys().min()?;
        let max = self.cells.keys().max()?;
        Some((*min, *max))
    }

    /// The non-blank region of the tape as a dense string, with its starting position.
    /// Interior blanks are rendered as the blank symbol.
    pub fn contents(&self) -> (Position, String) {
        match self.span() {
            Some((min, max)) => (min, (min..=max).map(|position| self.read(position)).collect()),
            None => (0, String::new()),
        }
    }

    pub fn non_blank_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.contents().1)
    }
}
