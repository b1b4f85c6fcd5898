//! This module defines the core data structures and types shared by the Turing Machine
//! engine: symbols, head directions, transition values, action records, execution outcomes
//! and the crate-wide error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single tape symbol. The alphabet is open: any `char` is a valid symbol.
pub type Symbol = char;

/// A signed tape address. Positions are unbounded in both directions.
pub type Position = i64;

/// The reserved symbol denoting a tape cell that was never written.
pub const BLANK_SYMBOL: Symbol = '_';
/// The maximum allowed size for a textual program import in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The maximum number of steps `run_to_halt` executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// The default delay between two automatic steps in Run mode, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// Represents the possible directions the head can move after a transition.
///
/// On the wire a direction is the single letter `"L"` or `"R"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R")]
    Right,
}

impl Direction {
    /// The signed head offset produced by this direction.
    pub fn offset(self) -> Position {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// The right-hand side of a transition rule: what to write, where to move, and the
/// state to enter next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
}

impl Transition {
    pub fn new(write: Symbol, direction: Direction, next_state: impl Into<String>) -> Self {
        Self {
            write,
            direction,
            next_state: next_state.into(),
        }
    }
}

/// The audit record of one applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub read: Symbol,
    pub write: Symbol,
    pub direction: Direction,
    pub from_state: String,
    pub to_state: String,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: read '{}', wrote '{}', moved {}, -> {}",
            self.from_state, self.read, self.write, self.direction, self.to_state
        )
    }
}

/// The lifecycle status of the engine itself, as opposed to the simulated machine's state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Accepting manual steps.
    #[default]
    Ready,
    /// Stepping automatically on every elapsed tick.
    Running,
    /// Terminal until the machine is reset, reloaded or rewound.
    Halted,
}

/// Represents the outcome of a single `step()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition was applied and the machine can keep going.
    Continue,
    /// The machine halted during this call.
    Halt(Halt),
    /// The engine was already halted; nothing changed.
    Ignored,
}

/// Why the machine stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The machine entered a state from the halt set (normal termination).
    Reached(String),
    /// No rule matches the current state and symbol. The machine is stuck.
    NoTransition { state: String, symbol: Symbol },
    /// The matching rule would move the head past the last addressable position.
    EdgeOfTape { position: Position },
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Reached(state) => write!(f, "reached halt state {}", state),
            Halt::NoTransition { state, symbol } => write!(
                f,
                "no matching transition for state {} and symbol '{}'",
                state, symbol
            ),
            Halt::EdgeOfTape { position } => {
                write!(f, "head cannot move past position {}", position)
            }
        }
    }
}

/// Represents the recoverable errors reported by the engine, the loader and the editor
/// interface. Halting is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringMachineError {
    /// An imported program is missing a required field or has an ill-formed value.
    #[error("Malformed program: {0}")]
    MalformedProgram(String),
    /// A history seek outside the recorded range.
    #[error("History index {index} out of range (history has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    /// A state cannot be deleted because it is still in use.
    #[error("State {state} is in use: {reason}")]
    StateInUse { state: String, reason: String },
    /// The named state is not part of the declared state set.
    #[error("Unknown state: {0}")]
    UnknownState(String),
    /// The named state is already declared.
    #[error("Duplicate state: {0}")]
    DuplicateState(String),
    /// Indicates an error related to reading program files.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"L\"");
        assert_eq!(right_json, "\"R\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        let right: Direction = serde_json::from_str(&right_json).unwrap();

        assert_eq!(left, Direction::Left);
        assert_eq!(right, Direction::Right);
        assert!(serde_json::from_str::<Direction>("\"S\"").is_err());
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Right.offset(), 1);
    }

    #[test]
    fn test_halt_display_distinguishes_reasons() {
        let reached = Halt::Reached("done".to_string()).to_string();
        let stuck = Halt::NoTransition {
            state: "q0".to_string(),
            symbol: 'x',
        }
        .to_string();

        assert!(reached.contains("done"));
        assert!(stuck.contains("no matching transition"));
        assert!(stuck.contains("'x'"));

        let edge = Halt::EdgeOfTape { position: i64::MAX }.to_string();
        assert!(edge.contains(&i64::MAX.to_string()));
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::IndexOutOfRange { index: 7, len: 3 };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("out of range"));
        assert!(error_msg.contains('7'));
    }
}
