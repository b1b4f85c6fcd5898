//! Built-in program catalog.
//!
//! Programs are embedded JSON documents, parsed once on first access.

use crate::loader::ProgramLoader;
use crate::program::Program;
use tracing::error;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 3] = [
    (
        "Binary Increment",
        include_str!("../programs/binary-increment.json"),
    ),
    (
        "Balanced Parentheses",
        include_str!("../programs/balanced-parentheses.json"),
    ),
    ("Busy Beaver 3", include_str!("../programs/busy-beaver-3.json")),
];

/// A named, embedded program together with its source text.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub source: &'static str,
    pub program: Program,
}

lazy_static::lazy_static! {
    static ref PRESETS: Vec<Preset> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, source)| {
            match ProgramLoader::load_program_from_string(source) {
                Ok(program) => Some(Preset { name, source, program }),
                Err(e) => {
                    error!(preset = name, error = %e, "failed to parse built-in program");
                    None
                }
            }
        })
        .collect();
}

pub fn all() -> &'static [Preset] {
    &PRESETS
}

/// Looks a preset up by name, ignoring ASCII case.
pub fn by_name(name: &str) -> Option<&'static Preset> {
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

pub fn names() -> Vec<&'static str> {
    PRESETS.iter().map(|preset| preset.name).collect()
}
