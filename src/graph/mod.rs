/*
    This module stores how grammar symbols lead into one another
*/

pub mod expander;
pub mod translator;

use std::collections::{HashMap, HashSet};

// Dense index of an interned symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

// Interns symbol names. Rules, token names and literals share one namespace
// and are told apart only by their text.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    ids: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

// One outgoing step from some symbol, recorded while translating `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub owner: SymbolId,
    pub to: SymbolId,
}

// Owner-tagged transition graph of a whole grammar.
//
// Only the translator writes to it; afterwards it is shared read-only with
// the expander and the emitter.
#[derive(Debug, Default)]
pub struct GrammarGraph {
    name: String,
    symbols: SymbolTable,
    // Keyed by the symbol the transition leaves from, in insertion order
    transitions: HashMap<SymbolId, Vec<Transition>>,
    // Symbols that can begin each rule, deduplicated, in insertion order
    rule_entries: HashMap<SymbolId, Vec<SymbolId>>,
    terminals: HashSet<SymbolId>,
}

impl GrammarGraph {
    fn new(name: &str) -> Self {
        GrammarGraph {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    // Duplicates are kept; the expander and emitter cope with them
    fn add_transition(&mut self, owner: SymbolId, from: SymbolId, to: SymbolId) {
        self.transitions.entry(from).or_default().push(Transition { owner, to });
    }

    fn add_rule_entry(&mut self, rule: SymbolId, symbol: SymbolId) {
        let entries = self.rule_entries.entry(rule).or_default();
        if !entries.contains(&symbol) {
            entries.push(symbol);
        }
    }

    fn mark_terminal(&mut self, symbol: SymbolId) {
        self.terminals.insert(symbol);
    }

    // Name of the grammar this graph was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name)
    }

    pub fn name_of(&self, symbol: SymbolId) -> &str {
        self.symbols.name(symbol)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn transitions_from(&self, from: SymbolId) -> &[Transition] {
        self.transitions.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    pub fn rule_entries(&self, rule: SymbolId) -> &[SymbolId] {
        self.rule_entries.get(&rule).map(Vec::as_slice).unwrap_or(&[])
    }

    // True when `symbol` can begin the body of `rule`.
    pub fn is_rule_entry(&self, rule: SymbolId, symbol: SymbolId) -> bool {
        self.rule_entries(rule).contains(&symbol)
    }

    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        self.terminals.contains(&symbol)
    }
}
