//! This module provides non-fatal lint checks for Turing Machine programs.
//!
//! Loading is deliberately permissive: transitions may reference states that were never
//! declared, and such states simply become reachable. The analyzer surfaces the things an
//! author most likely got wrong without ever rejecting a program.

use crate::program::Program;
use crate::types::{Symbol, BLANK_SYMBOL};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Represents the findings reported by [`analyze`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// States used by the initial state, the halt list or a transition but absent from the
    /// declared state list.
    UndeclaredStates(Vec<String>),
    /// Declared states that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// Halt states with outgoing rules. Those rules can never fire.
    HaltStateHasTransitions(Vec<String>),
    /// Symbols on the initial tape that no rule reads.
    UnhandledTapeSymbols(Vec<Symbol>),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UndeclaredStates(states) => {
                write!(f, "States used but not declared: {:?}", states)
            }
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
            Diagnostic::HaltStateHasTransitions(states) => {
                write!(f, "Halt states with outgoing transitions: {:?}", states)
            }
            Diagnostic::UnhandledTapeSymbols(symbols) => write!(
                f,
                "Initial tape contains symbols not handled by any transition: {:?}",
                symbols
            ),
        }
    }
}

/// Runs every check against `program` and returns all findings, in check order.
pub fn analyze(program: &Program) -> Vec<Diagnostic> {
    [
        check_undeclared_states,
        check_unreachable_states,
        check_halt_state_transitions,
        check_tape_symbols,
    ]
    .iter()
    .filter_map(|f| f(program))
    .collect()
}

fn check_undeclared_states(program: &Program) -> Option<Diagnostic> {
    let mut used = BTreeSet::new();
    used.insert(program.initial_state.clone());
    used.extend(program.halt_states.iter().map(str::to_string));
    for (key, transition) in program.transitions.iter() {
        used.insert(key.state);
        used.insert(transition.next_state.clone());
    }

    let undeclared: Vec<String> = used
        .into_iter()
        .filter(|state| !program.states.contains(state))
        .collect();

    (!undeclared.is_empty()).then_some(Diagnostic::UndeclaredStates(undeclared))
}

/// Depth-first walk of the rule graph from the initial state.
fn check_unreachable_states(program: &Program) -> Option<Diagnostic> {
    let mut visited = HashSet::new();
    let mut queue = vec![program.initial_state.clone()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }
        if program.is_halt_state(&state) {
            continue;
        }
        for (_, transition) in program.transitions.transitions_from(&state) {
            if !visited.contains(&transition.next_state) {
                queue.push(transition.next_state.clone());
            }
        }
    }

    let unreachable: Vec<String> = program
        .states
        .iter()
        .filter(|state| !visited.contains(*state))
        .map(str::to_string)
        .collect();

    (!unreachable.is_empty()).then_some(Diagnostic::UnreachableStates(unreachable))
}

fn check_halt_state_transitions(program: &Program) -> Option<Diagnostic> {
    let busy: Vec<String> = program
        .halt_states
        .iter()
        .filter(|state| program.transitions.has_rules_for(state))
        .map(str::to_string)
        .collect();

    (!busy.is_empty()).then_some(Diagnostic::HaltStateHasTransitions(busy))
}

fn check_tape_symbols(program: &Program) -> Option<Diagnostic> {
    let handled: HashSet<Symbol> = program
        .transitions
        .iter()
        .map(|(key, _)| key.symbol)
        .collect();

    let unhandled: BTreeSet<Symbol> = program
        .initial_tape
        .chars()
        .filter(|c| *c != BLANK_SYMBOL && !handled.contains(c))
        .collect();

    (!unhandled.is_empty()).then(|| Diagnostic::UnhandledTapeSymbols(unhandled.into_iter().collect()))
}
