//! This module provides the `TransitionTable`, the mapping from a typed
//! `(state, symbol)` key to the `Transition` applied when the machine meets that pair.

use crate::types::{Symbol, Transition};
use std::collections::HashMap;
use std::fmt;

/// The left-hand side of a transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionKey {
    pub state: String,
    pub symbol: Symbol,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            state: state.into(),
            symbol,
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.state, self.symbol)
    }
}

/// Rules grouped by source state, then by the symbol read. At most one rule per key.
///
/// Referenced state names are not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<Symbol, Transition>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rule for this exact pair. `None` is the engine's halting signal.
    pub fn lookup(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.rules.get(state)?.get(&symbol)
    }

    /// Inserts or replaces the rule for `key`, returning the replaced rule if any.
    pub fn upsert(&mut self, key: TransitionKey, value: Transition) -> Option<Transition> {
        self.rules
            .entry(key.state)
            .or_default()
            .insert(key.symbol, value)
    }

    pub fn remove(&mut self, state: &str, symbol: Symbol) -> Option<Transition> {
        let by_symbol = self.rules.get_mut(state)?;
        let removed = by_symbol.remove(&symbol);
        if by_symbol.is_empty() {
            self.rules.remove(state);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks whether any rule uses `state` as its source or its destination.
    pub fn references(&self, state: &str) -> bool {
        self.rules.contains_key(state)
            || self
                .rules
                .values()
                .flat_map(HashMap::values)
                .any(|t| t.next_state == state)
    }

    /// Returns true if `state` has at least one outgoing rule.
    pub fn has_rules_for(&self, state: &str) -> bool {
        self.rules.contains_key(state)
    }

    /// All rules, sorted by key for deterministic listing and export.
    pub fn iter(&self) -> impl Iterator<Item = (TransitionKey, &Transition)> {
        let mut entries: Vec<_> = self
            .rules
            .iter()
            .flat_map(|(state, by_symbol)| {
                by_symbol
                    .iter()
                    .map(move |(symbol, t)| (TransitionKey::new(state.clone(), *symbol), t))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter()
    }

    /// Outgoing rules from `state`, in no particular order.
    pub fn transitions_from(&self, state: &str) -> impl Iterator<Item = (&Symbol, &Transition)> {
        self.rules.get(state).into_iter().flat_map(HashMap::iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn table() -> TransitionTable {
        let mut table = TransitionTable::new();
        table.upsert(
            TransitionKey::new("q0", '1'),
            Transition::new('0', Direction::Left, "q0"),
        );
        table.upsert(
            TransitionKey::new("q0", '0'),
            Transition::new('1', Direction::Right, "done"),
        );
        table
    }

    #[test]
    fn test_lookup_exact_pair() {
        let table = table();
        assert_eq!(
            table.lookup("q0", '1'),
            Some(&Transition::new('0', Direction::Left, "q0"))
        );
        assert_eq!(table.lookup("q0", 'x'), None);
        assert_eq!(table.lookup("q1", '1'), None);
    }

    #[test]
    fn test_upsert_replaces_existing_rule() {
        let mut table = table();
        let previous = table.upsert(
            TransitionKey::new("q0", '1'),
            Transition::new('x', Direction::Right, "q9"),
        );

        assert_eq!(previous, Some(Transition::new('0', Direction::Left, "q0")));
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("q0", '1').unwrap().next_state, "q9");
    }

    #[test]
    fn test_remove_prunes_empty_states() {
        let mut table = table();
        assert!(table.remove("q0", '1').is_some());
        assert!(table.remove("q0", '1').is_none());
        assert!(table.remove("q0", '0').is_some());

        assert!(table.is_empty());
        assert!(!table.has_rules_for("q0"));
    }

    #[test]
    fn test_references_source_and_destination() {
        let table = table();
        assert!(table.references("q0"));
        assert!(table.references("done"));
        assert!(!table.references("elsewhere"));
    }

    #[test]
    fn test_delimiter_in_names_does_not_collide() {
        let mut table = TransitionTable::new();
        table.upsert(
            TransitionKey::new("a,b", 'c'),
            Transition::new('1', Direction::Right, "x"),
        );
        table.upsert(
            TransitionKey::new("a", ','),
            Transition::new('2', Direction::Right, "y"),
        );

        assert_eq!(table.lookup("a,b", 'c').unwrap().write, '1');
        assert_eq!(table.lookup("a", ',').unwrap().write, '2');
        assert_eq!(table.lookup("a", 'b'), None);
    }

    #[test]
    fn test_iter_is_sorted() {
        let keys: Vec<String> = table().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["q0,0", "q0,1"]);
    }
}
