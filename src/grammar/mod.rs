/*
    This module is for storing parsed grammars
*/

use crate::error_handling::Location;

// A single unit inside an alternative
#[derive(Debug, PartialEq, Clone)]
pub enum Element {
    // A token reference or a quoted literal, quotes included
    Terminal(String),
    // A reference to a parser rule
    Nonterminal(String),
    // A parenthesised alternation
    Group(AltList),
    // A group (or a single atom wrapped as one) followed by `?`, `*` or `+`
    Repeated(AltList, Suffix),
    // Embedded code or a semantic predicate
    Action,
    // Anything the graph has no use for: wildcards, negated sets, ranges
    Unrecognized,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Suffix {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

// The elements in a single alternative
pub type Alternative = Vec<Element>;

// The alternatives of a rule body or of a group
pub type AltList = Vec<Alternative>;

#[derive(Debug, PartialEq, Clone)]
pub struct RuleSpec {
    pub name: String,
    pub alternatives: AltList,
    pub location: Location,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GrammarKind {
    Combined,
    Parser,
    Lexer,
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub name: String,
    pub kind: GrammarKind,
    // Parser rules in file order
    pub rules: Vec<RuleSpec>,
    // Names of lexer rules and fragments; their bodies are not kept
    pub lexer_rules: Vec<String>,
}

impl Grammar {
    pub fn rule(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn first_rule(&self) -> Option<&RuleSpec> {
        self.rules.first()
    }
}

impl Element {
    // Wraps a single atom so that `x*` looks like `(x)*`
    pub fn repeated_atom(atom: Element, suffix: Suffix) -> Element {
        Element::Repeated(vec![vec![atom]], suffix)
    }
}
