use std::collections::HashSet;

use itertools::Itertools;

use crate::grammar::{Alternative, Element, Grammar};
use super::CompileErrorType::UndefinedRule;
use crate::error_handling::Location;
use super::{CompileError, CompileErrors};

// Every parser-rule name referenced by an element, however deeply nested
fn element_references(element: &Element) -> Vec<&str> {
    match element {
        Element::Nonterminal(name) => vec![name.as_str()],
        Element::Group(alternatives) | Element::Repeated(alternatives, _) => alternatives.iter()
            .flatten()
            .flat_map(element_references)
            .collect(),
        _ => Vec::new()
    }
}

fn get_alternative_undefined_rules(alternative: &Alternative, location: &Location, defined: &HashSet<&str>) -> CompileErrors {
    // Collect the rule references and keep the ones with no definition
    alternative.iter()
        .flat_map(element_references)
        .filter(|name| !defined.contains(name))
        .map(|name| CompileError {
            location: location.to_owned(),
            error: UndefinedRule(name.to_owned())
        })
        .collect()
}

// Parser rules that are referenced but never defined. These are not fatal:
// the graph simply treats such names as rules with an empty body
pub fn verify_rules(grammar: &Grammar) -> CompileErrors {
    let defined: HashSet<&str> = grammar.rules.iter().map(|rule| rule.name.as_str()).collect();

    // One report per missing name per rule is enough
    grammar.rules.iter()
        .flat_map(|rule| rule.alternatives.iter()
            .flat_map(|alternative| get_alternative_undefined_rules(alternative, &rule.location, &defined))
            .unique_by(|error| error.error.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn verify_defined_rules() {
        let grammar = parse_str("grammar T;\na : b (c | 'x')* ;\nb : A ;\nc : b ;", &PathBuf::new()).unwrap();
        assert!(verify_rules(&grammar).is_empty());
    }

    #[test]
    fn verify_undefined_rules() {
        let path = PathBuf::from("t.g4");
        let grammar = parse_str("grammar T;\na : b missing (other | missing) UNDEFINED_TOKEN ;\nb : missing ;", &path).unwrap();

        assert_eq!(verify_rules(&grammar), vec![
            CompileError {
                location: Location::at(path.clone(), 2, 1),
                error: UndefinedRule("missing".to_string())
            },
            CompileError {
                location: Location::at(path.clone(), 2, 1),
                error: UndefinedRule("other".to_string())
            },
            CompileError {
                location: Location::at(path, 3, 1),
                error: UndefinedRule("missing".to_string())
            }
        ]);
    }
}
