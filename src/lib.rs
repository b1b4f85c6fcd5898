//! This crate provides the core of a rewindable Turing Machine simulator: a sparse,
//! unbounded tape, an editable transition table, an execution engine with Run mode, and a
//! snapshot history that supports stepping backward and forward without re-execution.
//! Programs are imported and exported as JSON documents.

pub mod analyzer;
pub mod config;
pub mod history;
pub mod loader;
pub mod machine;
pub mod presets;
pub mod program;
pub mod table;
pub mod tape;
pub mod ticker;
pub mod types;

/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
pub use config::Config;
pub use history::{History, Snapshot};
/// Re-exports the loader and its wire format.
pub use loader::{ProgramDocument, ProgramLoader, RuleDocument};
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
pub use program::{Program, StateSet};
pub use table::{TransitionKey, TransitionTable};
pub use tape::Tape;
/// Re-exports various types related to Turing Machine definition and execution from the types module.
pub use types::{
    Action, Direction, Halt, Position, Status, Step, Symbol, Transition, TuringMachineError,
    BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
