/*
    This module walks a grammar graph from one start rule, with a depth bound

    The walk starts with the start rule as its own context. From every symbol
    it follows only the transitions owned by the current context, which keeps
    the chain inside one rule body. Each symbol reached can also become a new
    context of its own ("look inside this rule"), and only that step uses up
    depth.

    Every `(context, symbol)` pair is expanded at most once, so the walk
    terminates on recursive and mutually recursive rules alike.
*/

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use super::{GrammarGraph, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: SymbolId,
    pub to: SymbolId,
}

// Symbols already expanded, per context rule.
#[derive(Debug, Default)]
pub struct VisitationRecord {
    visited: HashMap<SymbolId, HashSet<SymbolId>>,
}

impl VisitationRecord {
    // Records `node` under `context`; false if it was already there.
    pub fn visit(&mut self, context: SymbolId, node: SymbolId) -> bool {
        self.visited.entry(context).or_default().insert(node)
    }

    // Number of `(context, node)` pairs recorded.
    pub fn len(&self) -> usize {
        self.visited.values().map(HashSet::len).sum()
    }
}

// The part of the graph that is reachable from one start symbol.
#[derive(Debug, PartialEq)]
pub struct Expansion {
    pub start: String,
    // Distinct edges in the order they were first reached.
    pub edges: Vec<Edge>,
    // Distinct terminals in the order they were first reached.
    pub terminals: Vec<SymbolId>,
    // How many `(context, node)` pairs were expanded.
    pub visited: usize,
}

enum Task {
    Expand { context: SymbolId, node: SymbolId, depth: usize },
    Emit(Edge),
}

// Collects everything reachable from `start` while entering at most
// `max_depth` nested rule bodies. An unknown `start` gives an empty result.
pub fn expand(graph: &GrammarGraph, start: &str, max_depth: usize) -> Expansion {
    let mut record = VisitationRecord::default();
    let mut edges = Vec::new();
    let mut terminals = Vec::new();

    // Explicit stack instead of recursion; tasks are pushed in reverse so they
    // pop in the same order the recursive walk would run them
    let mut stack = Vec::new();
    if let Some(start) = graph.lookup(start) {
        stack.push(Task::Expand { context: start, node: start, depth: 1 });
    }

    while let Some(task) = stack.pop() {
        let (context, node, depth) = match task {
            Task::Emit(edge) => {
                edges.push(edge);
                continue;
            }
            Task::Expand { context, node, depth } => (context, node, depth),
        };

        if !record.visit(context, node) {
            continue;
        }
        if graph.is_terminal(node) {
            terminals.push(node);
        }

        let followed = graph.transitions_from(node)
            .iter()
            .filter(|transition| transition.owner == context);
        for transition in followed.rev() {
            let to = transition.to;
            if depth <= max_depth {
                stack.push(Task::Expand { context: to, node: to, depth: depth + 1 });
            }
            stack.push(Task::Expand { context, node: to, depth });
            stack.push(Task::Emit(Edge { from: node, to }));
        }
    }

    Expansion {
        start: start.to_string(),
        edges: edges.into_iter().unique().collect(),
        terminals: terminals.into_iter().unique().collect(),
        visited: record.len(),
    }
}
