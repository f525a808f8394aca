/*
    This module turns parser rule bodies into owner-tagged transitions
*/

use std::collections::HashSet;

use log::debug;

use crate::grammar::{AltList, Alternative, Element, Grammar, RuleSpec};
use super::{GrammarGraph, SymbolId};

// Separator and newline names that carry no structure of their own.
pub const DEFAULT_SKIPPED: [&str; 4] = ["nls", "NL", "sep", "SEMI"];

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    // Element names left out of the graph without breaking the sequence
    // around them.
    pub skipped: Vec<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            skipped: DEFAULT_SKIPPED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// The symbols a stretch of grammar can begin with and end with
#[derive(Debug, Default, PartialEq)]
struct Frontier {
    starts: Vec<SymbolId>,
    ends: Vec<SymbolId>,
}

impl Frontier {
    fn single(symbol: SymbolId) -> Self {
        Frontier { starts: vec![symbol], ends: vec![symbol] }
    }

    fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    fn merge(&mut self, other: Frontier) {
        push_unique(&mut self.starts, other.starts);
        push_unique(&mut self.ends, other.ends);
    }
}

fn push_unique(set: &mut Vec<SymbolId>, symbols: Vec<SymbolId>) {
    for symbol in symbols {
        if !set.contains(&symbol) {
            set.push(symbol);
        }
    }
}

struct Translator<'o> {
    graph: GrammarGraph,
    skipped: HashSet<&'o str>,
}

impl Translator<'_> {
    fn translate_rule(&mut self, rule: &RuleSpec) {
        debug!("translating rule `{}`", rule.name);
        let head = self.graph.intern(&rule.name);

        let entries = self.translate_alt_list(head, &rule.alternatives).starts;
        for start in entries {
            self.graph.add_transition(head, head, start);
            self.graph.add_rule_entry(head, start);
        }
    }

    // A rule body or group matches if any one alternative does. Every edge
    // added below `head` is owned by it
    fn translate_alt_list(&mut self, head: SymbolId, alternatives: &AltList) -> Frontier {
        let mut frontier = Frontier::default();
        for alternative in alternatives {
            frontier.merge(self.translate_alternative(head, alternative));
        }
        frontier
    }

    fn translate_alternative(&mut self, head: SymbolId, alternative: &Alternative) -> Frontier {
        let mut starts = Vec::new();
        let mut ends = Vec::new();

        for element in alternative {
            let current = self.translate_element(head, element);
            if current.is_empty() {
                continue;
            }

            for &from in &ends {
                for &to in &current.starts {
                    self.graph.add_transition(head, from, to);
                }
            }

            if starts.is_empty() {
                starts = current.starts;
            }
            ends = current.ends;
        }

        Frontier { starts, ends }
    }

    fn translate_element(&mut self, head: SymbolId, element: &Element) -> Frontier {
        match element {
            Element::Terminal(name) if !self.skipped.contains(name.as_str()) => {
                let symbol = self.graph.intern(name);
                self.graph.mark_terminal(symbol);
                Frontier::single(symbol)
            }
            Element::Nonterminal(name) if !self.skipped.contains(name.as_str()) => {
                Frontier::single(self.graph.intern(name))
            }
            // Repetition adds no loop back edge, the inner group is all that counts
            Element::Group(alternatives) | Element::Repeated(alternatives, _) => {
                self.translate_alt_list(head, alternatives)
            }
            _ => Frontier::default()
        }
    }
}

// Builds the transition graph for every parser rule of `grammar`.
pub fn translate(grammar: &Grammar, options: &TranslateOptions) -> GrammarGraph {
    let mut translator = Translator {
        graph: GrammarGraph::new(&grammar.name),
        skipped: options.skipped.iter().map(String::as_str).collect(),
    };
    for rule in &grammar.rules {
        translator.translate_rule(rule);
    }
    translator.graph
}
