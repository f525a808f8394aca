/*
    This module writes expansions out as Graphviz DOT text
*/

use std::fmt::Display;

use crate::graph::expander::Expansion;
use crate::graph::GrammarGraph;

pub const DEFAULT_NODE_COLOR: &str = "#aa6666";

#[derive(Debug, Clone, PartialEq)]
pub struct DotStyle {
    // Graphviz `size` attribute, in inches
    pub size: String,
    pub dpi: u32,
    pub terminal_color: String,
    pub start_color: String,
}

impl Default for DotStyle {
    fn default() -> Self {
        DotStyle {
            size: "10,10".to_string(),
            dpi: 300,
            terminal_color: DEFAULT_NODE_COLOR.to_string(),
            start_color: DEFAULT_NODE_COLOR.to_string(),
        }
    }
}

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

// Plain identifiers go out as they are, everything else is quoted. DOT
// keywords are reserved in any case, so they get quoted too
pub fn dot_id(name: &str) -> String {
    let plain = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name));

    if plain {
        name.to_string()
    } else {
        quoted(name)
    }
}

// Double-quoted DOT string with `\` and `"` escaped
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

struct DotGraph<'a> {
    graph: &'a GrammarGraph,
    expansion: &'a Expansion,
    style: &'a DotStyle,
}

impl Display for DotGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let DotGraph { graph, expansion, style } = self;

        writeln!(f, "digraph {} {{", dot_id(graph.name()))?;
        writeln!(f, "    graph [size={}];", quoted(&style.size))?;
        writeln!(f, "    graph [dpi={}];", style.dpi)?;
        writeln!(f, "    rankdir=LR;")?;
        writeln!(f, "    node [style=filled];")?;
        writeln!(f, "    node [shape=box];")?;

        for edge in &expansion.edges {
            // Dashed edges lead into a rule body, heavy ones continue a sequence
            let attributes = if graph.is_rule_entry(edge.from, edge.to) {
                "style=dashed"
            } else {
                "penwidth=3.0"
            };
            writeln!(
                f,
                "    {} -> {} [{}];",
                dot_id(graph.name_of(edge.from)),
                dot_id(graph.name_of(edge.to)),
                attributes
            )?;
        }

        for &terminal in &expansion.terminals {
            let name = graph.name_of(terminal);
            if name != expansion.start {
                writeln!(f, "    {} [fillcolor={}];", dot_id(name), quoted(&style.terminal_color))?;
            }
        }
        writeln!(f, "    {} [fillcolor={}];", dot_id(&expansion.start), quoted(&style.start_color))?;

        writeln!(f, "}}")
    }
}

// Renders an expansion of `graph` as a DOT digraph: all edges first, then
// the highlighted nodes, with the start node last.
pub fn generate(graph: &GrammarGraph, expansion: &Expansion, style: &DotStyle) -> String {
    DotGraph { graph, expansion, style }.to_string()
}
