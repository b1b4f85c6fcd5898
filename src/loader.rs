//! This module provides the `ProgramLoader`, which turns untrusted program documents
//! (JSON text, files, or already-parsed values) into validated [`Program`]s, and the
//! reverse direction used for export.

use crate::analyzer::analyze;
use crate::program::Program;
use crate::table::{TransitionKey, TransitionTable};
use crate::types::{Direction, Position, Transition, TuringMachineError, MAX_PROGRAM_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The import/export wire format.
///
/// Every field is optional at the serde level so that a missing required field is
/// reported as `MalformedProgram` with the field's name rather than a generic parse error.
/// Textual and `Value` imports check the required fields before any field is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt_states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transitions: Option<BTreeMap<String, RuleDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_tape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Position>,
    /// Position of the first character of `initialTape`. Only emitted when non-zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tape_offset: Option<Position>,
}

/// The value side of one `"<state>,<symbol>"` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub write: String,
    #[serde(rename = "move")]
    pub direction: Direction,
    pub next: String,
}

/// `ProgramLoader` is a utility struct for loading and exporting Turing Machine programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from a JSON file.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::MalformedProgram)` if the content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_program_from_string(&content)
    }

    /// Loads a single program from JSON text, bounded by [`MAX_PROGRAM_SIZE`].
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        Self::load_program_with_limit(content, MAX_PROGRAM_SIZE)
    }

    /// Loads a single program from JSON text no longer than `max_size` bytes.
    pub fn load_program_with_limit(
        content: &str,
        max_size: usize,
    ) -> Result<Program, TuringMachineError> {
        if content.len() > max_size {
            return Err(TuringMachineError::MalformedProgram(format!(
                "program exceeds {} bytes",
                max_size
            )));
        }

        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| TuringMachineError::MalformedProgram(e.to_string()))?;

        Self::load_program_from_value(value)
    }

    /// Loads a program from an already-parsed JSON value.
    pub fn load_program_from_value(
        value: serde_json::Value,
    ) -> Result<Program, TuringMachineError> {
        let fields = value.as_object().ok_or_else(|| {
            TuringMachineError::MalformedProgram("program must be a JSON object".to_string())
        })?;
        for field in REQUIRED_FIELDS {
            if fields.get(field).is_none_or(serde_json::Value::is_null) {
                return Err(missing(field));
            }
        }

        let document: ProgramDocument = serde_json::from_value(value)
            .map_err(|e| TuringMachineError::MalformedProgram(e.to_string()))?;

        Self::load_document(document)
    }

    /// Validates a document and normalizes it into a `Program`.
    ///
    /// Required fields are checked in order (`states`, `initialState`, `transitions`), first
    /// failure wins. Optional fields default to no halt states, an empty tape and position 0.
    /// Transition targets are not cross-checked against the declared states.
    pub fn load_document(document: ProgramDocument) -> Result<Program, TuringMachineError> {
        let states = document.states.ok_or_else(|| missing("states"))?;
        let initial_state = document.initial_state.ok_or_else(|| missing("initialState"))?;
        let rules = document.transitions.ok_or_else(|| missing("transitions"))?;

        let mut transitions = TransitionTable::new();
        for (key, rule) in rules {
            let key = parse_key(&key)?;
            let write = single_symbol(&rule.write).ok_or_else(|| {
                TuringMachineError::MalformedProgram(format!(
                    "transition {}: write must be exactly one character, got {:?}",
                    key, rule.write
                ))
            })?;
            transitions.upsert(key, Transition::new(write, rule.direction, rule.next));
        }

        let initial_tape = document.initial_tape.unwrap_or_default();
        let tape_offset = document.tape_offset.unwrap_or(0);
        let last = initial_tape.chars().count().saturating_sub(1);
        if Position::try_from(last).ok().and_then(|n| tape_offset.checked_add(n)).is_none() {
            return Err(TuringMachineError::MalformedProgram(format!(
                "initialTape starting at {} runs past the last tape position",
                tape_offset
            )));
        }

        let program = Program {
            states: states.into_iter().collect(),
            initial_state,
            halt_states: document.halt_states.unwrap_or_default().into_iter().collect(),
            transitions,
            initial_tape,
            tape_offset,
            start_position: document.start_position.unwrap_or(0),
        };

        for diagnostic in analyze(&program) {
            warn!(%diagnostic, "program diagnostic");
        }

        Ok(program)
    }

    /// Loads all `.json` programs in `directory`, one result per file.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect()
    }

    /// Converts a program back into its wire document.
    pub fn to_document(program: &Program) -> ProgramDocument {
        let transitions = program
            .transitions
            .iter()
            .map(|(key, transition)| {
                (
                    key.to_string(),
                    RuleDocument {
                        write: transition.write.to_string(),
                        direction: transition.direction,
                        next: transition.next_state.clone(),
                    },
                )
            })
            .collect();

        ProgramDocument {
            states: Some(program.states.to_vec()),
            initial_state: Some(program.initial_state.clone()),
            halt_states: Some(program.halt_states.to_vec()),
            transitions: Some(transitions),
            initial_tape: Some(program.initial_tape.clone()),
            start_position: Some(program.start_position),
            tape_offset: (program.tape_offset != 0).then_some(program.tape_offset),
        }
    }

    /// Serializes a program as pretty-printed JSON.
    pub fn to_json(program: &Program) -> Result<String, TuringMachineError> {
        serde_json::to_string_pretty(&Self::to_document(program))
            .map_err(|e| TuringMachineError::MalformedProgram(e.to_string()))
    }
}

const REQUIRED_FIELDS: [&str; 3] = ["states", "initialState", "transitions"];

fn missing(field: &str) -> TuringMachineError {
    TuringMachineError::MalformedProgram(format!("missing required field: {}", field))
}

/// Splits `"<state>,<symbol>"`. The symbol is the final character, so state names may
/// contain commas (or be empty) and `,` itself may be a symbol.
fn parse_key(key: &str) -> Result<TransitionKey, TuringMachineError> {
    let mut chars = key.chars();
    match (chars.next_back(), chars.next_back()) {
        (Some(symbol), Some(',')) => Ok(TransitionKey::new(chars.as_str(), symbol)),
        _ => Err(TuringMachineError::MalformedProgram(format!(
            "invalid transition key {:?}, expected \"<state>,<symbol>\"",
            key
        ))),
    }
}

fn single_symbol(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        _ => None,
    }
}
