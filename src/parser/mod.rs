/*
    This module parses ANTLR-style grammar files
*/

mod lexer;
pub mod verifier;

use std::fmt::Display;
use std::path::Path;

use crate::grammar::*;
use crate::error_handling::*;
use lexer::*;

#[derive(Debug)]
pub enum CompileErrorType {
    // The file does not start with `grammar Name;`
    MissingGrammarDecl,
    // Something other than a rule name where a rule should start
    MissingRuleName,
    // A rule name is not followed by `:`
    MissingColon,
    // A rule body is not terminated by `;`
    MissingSemicolon,
    // A `(` without its `)`
    UnclosedGroup,
    // A token that makes no sense where it is
    UnexpectedToken(String),
    // The file ended in the middle of a construct
    UnexpectedEof,
    // There is an unclosed quote
    UnmatchedQuote,
    // There is an unclosed `{`
    UnclosedAction,
    // There is an unclosed `[`
    UnclosedArgument,
    // There is an unclosed `/*`
    UnclosedComment,
    // A character that can't start any token
    UnexpectedCharacter(char),
    // A rule references a parser rule that is never defined
    UndefinedRule(String),
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        use CompileErrorType::*;
        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (UnexpectedToken(a), UnexpectedToken(b)) => a == b,
            (UndefinedRule(a), UndefinedRule(b)) => a == b,
            (UnexpectedCharacter(a), UnexpectedCharacter(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other)
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingGrammarDecl => write!(f, "Expected `grammar <name>;` at the start of the file"),
            CompileErrorType::MissingRuleName => write!(f, "Expected a rule name"),
            CompileErrorType::MissingColon => write!(f, "Expected `:` after rule name"),
            CompileErrorType::MissingSemicolon => write!(f, "Expected `;` at the end of the rule"),
            CompileErrorType::UnclosedGroup => write!(f, "Unclosed `(`"),
            CompileErrorType::UnexpectedToken(token) => write!(f, "Unexpected `{}`", token),
            CompileErrorType::UnexpectedEof => write!(f, "Unexpected end of file"),
            CompileErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            CompileErrorType::UnclosedAction => write!(f, "Unclosed `{{`"),
            CompileErrorType::UnclosedArgument => write!(f, "Unclosed `[`"),
            CompileErrorType::UnclosedComment => write!(f, "Unclosed comment"),
            CompileErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            CompileErrorType::UndefinedRule(rule) => write!(f, "Could not find definition for rule `{}`", rule),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> CompileError {
    CompileError {
        location: Location::file(file.to_path_buf()),
        error: CompileErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type RuleResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

fn is_token_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

struct GrammarParser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
    file: &'a Path
}

impl<'a> GrammarParser<'a> {
    fn new(lexemes: &'a [Lexeme], file: &'a Path) -> Self {
        GrammarParser { lexemes, pos: 0, file }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.lexemes.get(self.pos + offset).map(|l| &l.token)
    }

    fn peek_identifier(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Identifier(s)) if s == keyword)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // Consumes the next token if it is `expected`
    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn location(&self) -> Location {
        let lexeme = self.lexemes.get(self.pos).or_else(|| self.lexemes.last());
        match lexeme {
            Some(l) => Location::at(self.file.to_path_buf(), l.position.line, l.position.column),
            None => Location::file(self.file.to_path_buf())
        }
    }

    fn error(&self, error: CompileErrorType) -> CompileError {
        CompileError { location: self.location(), error }
    }

    // Error for whatever token is sitting at the cursor
    fn unexpected(&self) -> CompileError {
        match self.peek() {
            Some(token) => self.error(CompileErrorType::UnexpectedToken(token.to_string())),
            None => self.error(CompileErrorType::UnexpectedEof)
        }
    }

    fn expect(&mut self, expected: &Token, error: CompileErrorType) -> RuleResult<()> {
        if self.eat(expected) {
            Ok(())
        } else if self.peek().is_none() {
            Err(self.error(CompileErrorType::UnexpectedEof))
        } else {
            Err(self.error(error))
        }
    }

    fn expect_action(&mut self) -> RuleResult<()> {
        match self.peek() {
            Some(Token::Action(_)) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.unexpected())
        }
    }

    fn expect_argument(&mut self) -> RuleResult<()> {
        match self.peek() {
            Some(Token::Argument(_)) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.unexpected())
        }
    }

    fn expect_identifier(&mut self) -> RuleResult<&'a str> {
        match self.peek() {
            Some(Token::Identifier(s)) => {
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected())
        }
    }

    // Skips past the next `;` that is not nested in parentheses
    fn skip_past_semicolon(&mut self) -> RuleResult<()> {
        let mut depth = 0usize;
        while let Some(token) = self.advance() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::Semi if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error(CompileErrorType::MissingSemicolon))
    }

    // grammarDecl = ('lexer' | 'parser')? 'grammar' identifier ';'
    fn parse_grammar_decl(&mut self) -> RuleResult<(String, GrammarKind)> {
        let kind = if self.peek_identifier("lexer") {
            GrammarKind::Lexer
        } else if self.peek_identifier("parser") {
            GrammarKind::Parser
        } else {
            GrammarKind::Combined
        };
        if kind != GrammarKind::Combined {
            self.pos += 1;
        }

        if !self.peek_identifier("grammar") {
            return Err(self.error(CompileErrorType::MissingGrammarDecl));
        }
        self.pos += 1;

        let name = match self.peek() {
            Some(Token::Identifier(name)) => name.clone(),
            _ => return Err(self.error(CompileErrorType::MissingGrammarDecl))
        };
        self.pos += 1;
        self.expect(&Token::Semi, CompileErrorType::MissingSemicolon)?;

        Ok((name, kind))
    }

    fn parse_top_level(&mut self, rules: &mut Vec<RuleSpec>, lexer_rules: &mut Vec<String>) -> RuleResult<()> {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Identifier(s)), Some(Token::Action(_)))
                if s == "options" || s == "tokens" || s == "channels" => {
                self.pos += 2;
                Ok(())
            }
            (Some(Token::Identifier(s)), Some(Token::Identifier(_))) if s == "import" || s == "mode" => {
                self.skip_past_semicolon()
            }
            (Some(Token::At), _) => self.skip_named_action(),
            (Some(Token::Identifier(s)), Some(Token::Identifier(_))) if s == "fragment" => {
                self.pos += 1;
                self.parse_lexer_rule(lexer_rules)
            }
            (Some(Token::Identifier(s)), _) if is_token_name(s) => self.parse_lexer_rule(lexer_rules),
            (Some(Token::Identifier(_)), _) => {
                let rule = self.parse_rule()?;
                rules.push(rule);
                Ok(())
            }
            _ => Err(self.error(CompileErrorType::MissingRuleName))
        }
    }

    // '@' (identifier '::')? identifier action
    fn skip_named_action(&mut self) -> RuleResult<()> {
        self.expect(&Token::At, CompileErrorType::MissingRuleName)?;
        self.expect_identifier()?;
        if self.eat(&Token::Colon) {
            self.expect(&Token::Colon, CompileErrorType::MissingColon)?;
            self.expect_identifier()?;
        }
        self.expect_action()
    }

    fn parse_lexer_rule(&mut self, lexer_rules: &mut Vec<String>) -> RuleResult<()> {
        let name = self.expect_identifier()?;
        lexer_rules.push(name.to_string());
        self.skip_past_semicolon()
    }

    // ruleSpec = RULE_REF prequel* ':' altList ';' exceptionGroup
    fn parse_rule(&mut self) -> RuleResult<RuleSpec> {
        let location = self.location();
        let name = self.expect_identifier()?.to_string();

        while !self.eat(&Token::Colon) {
            match self.peek() {
                Some(Token::Argument(_)) => self.pos += 1,
                Some(Token::Identifier(s)) if s == "returns" || s == "locals" => {
                    self.pos += 1;
                    self.expect_argument()?;
                }
                Some(Token::Identifier(s)) if s == "throws" => {
                    self.pos += 1;
                    self.expect_identifier()?;
                    while self.eat(&Token::Comma) {
                        self.expect_identifier()?;
                    }
                }
                Some(Token::Identifier(s)) if s == "options" => {
                    self.pos += 1;
                    self.expect_action()?;
                }
                Some(Token::At) => {
                    self.pos += 1;
                    self.expect_identifier()?;
                    self.expect_action()?;
                }
                None => return Err(self.error(CompileErrorType::UnexpectedEof)),
                Some(_) => return Err(self.error(CompileErrorType::MissingColon))
            }
        }

        let alternatives = self.parse_alt_list()?;
        self.expect(&Token::Semi, CompileErrorType::MissingSemicolon)?;
        self.skip_exception_group()?;

        Ok(RuleSpec { name, alternatives, location })
    }

    // ('catch' argument action)* ('finally' action)?
    fn skip_exception_group(&mut self) -> RuleResult<()> {
        while self.peek_identifier("catch") && matches!(self.peek_at(1), Some(Token::Argument(_))) {
            self.pos += 2;
            self.expect_action()?;
        }
        if self.peek_identifier("finally") && matches!(self.peek_at(1), Some(Token::Action(_))) {
            self.pos += 2;
        }
        Ok(())
    }

    // altList = alternative ('|' alternative)*
    fn parse_alt_list(&mut self) -> RuleResult<AltList> {
        let mut alternatives = vec![self.parse_alternative()?];
        while self.eat(&Token::Or) {
            alternatives.push(self.parse_alternative()?);
        }
        Ok(alternatives)
    }

    // alternative = elementOptions? element* ('#' identifier)?
    fn parse_alternative(&mut self) -> RuleResult<Alternative> {
        self.skip_element_options()?;

        let mut elements = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Or) | Some(Token::Semi) | Some(Token::RParen) | None => break,
                Some(Token::Pound) => {
                    self.pos += 1;
                    self.expect_identifier()?;
                    break;
                }
                Some(_) => elements.push(self.parse_element()?)
            }
        }
        Ok(elements)
    }

    fn parse_element(&mut self) -> RuleResult<Element> {
        match (self.peek(), self.peek_at(1)) {
            // Labels are irrelevant to the graph
            (Some(Token::Identifier(_)), Some(Token::Assign | Token::PlusAssign)) => {
                self.pos += 2;
                self.parse_element()
            }
            (Some(Token::LParen), _) => {
                let block = self.parse_block()?;
                Ok(match self.parse_suffix() {
                    Some(suffix) => Element::Repeated(block, suffix),
                    None => Element::Group(block)
                })
            }
            (Some(Token::Action(_)), _) => {
                self.pos += 1;
                // Semantic predicate
                self.eat(&Token::Question);
                Ok(Element::Action)
            }
            _ => {
                let atom = self.parse_atom()?;
                Ok(match self.parse_suffix() {
                    Some(suffix) => Element::repeated_atom(atom, suffix),
                    None => atom
                })
            }
        }
    }

    fn parse_atom(&mut self) -> RuleResult<Element> {
        let atom = match self.peek() {
            Some(Token::Identifier(name)) => {
                self.pos += 1;
                if is_token_name(name) {
                    Element::Terminal(name.clone())
                } else {
                    // Rule arguments
                    if let Some(Token::Argument(_)) = self.peek() {
                        self.pos += 1;
                    }
                    Element::Nonterminal(name.clone())
                }
            }
            Some(Token::Literal(text)) => {
                self.pos += 1;
                if self.eat(&Token::Range) {
                    match self.advance() {
                        Some(Token::Literal(_)) => Element::Unrecognized,
                        _ => return Err(self.unexpected())
                    }
                } else {
                    Element::Terminal(text.clone())
                }
            }
            Some(Token::Dot) => {
                self.pos += 1;
                Element::Unrecognized
            }
            Some(Token::Tilde) => {
                self.pos += 1;
                match self.peek() {
                    Some(Token::LParen) => {
                        self.parse_block()?;
                    }
                    Some(Token::Argument(_)) => self.pos += 1,
                    _ => {
                        self.parse_atom()?;
                    }
                }
                Element::Unrecognized
            }
            _ => return Err(self.unexpected())
        };
        self.skip_element_options()?;
        Ok(atom)
    }

    // block = '(' (optionsSpec? ruleAction* ':')? altList ')'
    fn parse_block(&mut self) -> RuleResult<AltList> {
        let open = self.location();
        self.expect(&Token::LParen, CompileErrorType::UnclosedGroup)?;

        let mut has_prequel = false;
        if self.peek_identifier("options") && matches!(self.peek_at(1), Some(Token::Action(_))) {
            self.pos += 2;
            has_prequel = true;
        }
        while let (Some(Token::At), Some(Token::Identifier(_)), Some(Token::Action(_))) =
            (self.peek(), self.peek_at(1), self.peek_at(2)) {
            self.pos += 3;
            has_prequel = true;
        }
        if has_prequel {
            self.expect(&Token::Colon, CompileErrorType::MissingColon)?;
        }

        let alternatives = self.parse_alt_list()?;
        if !self.eat(&Token::RParen) {
            return Err(CompileError { location: open, error: CompileErrorType::UnclosedGroup });
        }
        Ok(alternatives)
    }

    // ('?' | '*' | '+') '?'?
    fn parse_suffix(&mut self) -> Option<Suffix> {
        let suffix = match self.peek() {
            Some(Token::Question) => Suffix::Optional,
            Some(Token::Star) => Suffix::ZeroOrMore,
            Some(Token::Plus) => Suffix::OneOrMore,
            _ => return None
        };
        self.pos += 1;
        // Non-greedy marker
        self.eat(&Token::Question);
        Some(suffix)
    }

    // '<' ... '>'
    fn skip_element_options(&mut self) -> RuleResult<()> {
        if !self.eat(&Token::Lt) {
            return Ok(());
        }
        while let Some(token) = self.advance() {
            if *token == Token::Gt {
                return Ok(());
            }
        }
        Err(self.error(CompileErrorType::UnexpectedEof))
    }

    // Collects every rule error instead of stopping at the first one
    fn parse_grammar(&mut self) -> FileResult<Grammar> {
        let (name, kind) = self.parse_grammar_decl().map_err(|e| vec![e])?;

        let mut rules = Vec::new();
        let mut lexer_rules = Vec::new();
        let mut errors = Vec::new();

        while self.peek().is_some() {
            if let Err(error) = self.parse_top_level(&mut rules, &mut lexer_rules) {
                errors.push(error);
                // Resynchronize at the end of the broken rule. Running out of
                // tokens here was already reported above
                let _ = self.skip_past_semicolon();
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Grammar {
            name,
            kind,
            rules,
            lexer_rules
        })
    }
}

pub fn parse_str(text: &str, path: &Path) -> FileResult<Grammar> {
    let lexemes = lexer::lex(text).map_err(|(error, position)| vec![CompileError {
        location: Location::at(path.to_path_buf(), position.line, position.column),
        error
    }])?;

    GrammarParser::new(&lexemes, path).parse_grammar()
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let text = std::fs::read_to_string(path).map_err(|e| vec![io_error(e, path)])?;
    parse_str(&text, path)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;
    use std::path::PathBuf;

    use super::*;

    fn nonterminal(text: &str) -> Element {
        Element::Nonterminal(text.to_string())
    }

    fn terminal(text: &str) -> Element {
        Element::Terminal(text.to_string())
    }

    fn parse(text: &str) -> FileResult<Grammar> {
        parse_str(text, &PathBuf::from("test.g4"))
    }

    fn parse_body(body: &str) -> AltList {
        let text = format!("grammar T;\nr : {} ;", body);
        parse(&text).unwrap().rules.remove(0).alternatives
    }

    fn error_kinds(text: &str) -> Vec<(usize, CompileErrorType)> {
        parse(text)
            .unwrap_err()
            .into_iter()
            .map(|e| (e.location.line, e.error))
            .collect()
    }

    #[test]
    fn parse_normal_alternatives() {
        let bodies = vec![
            "'x' b | 'y'",
            "a=expr op+=('*' | '/') b=expr # Mul",
            "ID (',' ID)* ';'?",
            ""
        ];
        let answers = vec![
            vec![
                vec![terminal("'x'"), nonterminal("b")],
                vec![terminal("'y'")]
            ],
            vec![vec![
                nonterminal("expr"),
                Element::Group(vec![vec![terminal("'*'")], vec![terminal("'/'")]]),
                nonterminal("expr")
            ]],
            vec![vec![
                terminal("ID"),
                Element::Repeated(vec![vec![terminal("','"), terminal("ID")]], Suffix::ZeroOrMore),
                Element::repeated_atom(terminal("';'"), Suffix::Optional)
            ]],
            vec![vec![]]
        ];

        for (body, answer) in zip(bodies, answers) {
            assert_eq!(parse_body(body), answer);
        }
    }

    #[test]
    fn parse_non_graph_content() {
        let bodies = vec![
            "{ count++; } a {$x > 0}? b",
            "~('\\n' | '\\r') . 'a'..'z'",
            "expr[0] <assoc=right> c+?",
            "( options { greedy=false; } : a | b )"
        ];
        let answers = vec![
            vec![vec![Element::Action, nonterminal("a"), Element::Action, nonterminal("b")]],
            vec![vec![Element::Unrecognized, Element::Unrecognized, Element::Unrecognized]],
            vec![vec![nonterminal("expr"), Element::repeated_atom(nonterminal("c"), Suffix::OneOrMore)]],
            vec![vec![Element::Group(vec![vec![nonterminal("a")], vec![nonterminal("b")]])]]
        ];

        for (body, answer) in zip(bodies, answers) {
            assert_eq!(parse_body(body), answer);
        }
    }

    #[test]
    fn parse_rule_prequel() {
        let text = "parser grammar P;\n\
            options { tokenVocab=L; }\n\
            @header { package x; }\n\
            stat[int n] returns [int v] locals [int i] @init { i = 0; } : ID ;\n\
            catch [RecognitionException e] { throw e; }\n\
            finally { done(); }\n\
            other : stat ;";
        let grammar = parse(text).unwrap();

        assert_eq!(grammar.name, "P");
        assert_eq!(grammar.kind, GrammarKind::Parser);
        assert_eq!(grammar.rules.len(), 2);
        assert_eq!(grammar.rules[0].name, "stat");
        assert_eq!(grammar.rules[0].alternatives, vec![vec![terminal("ID")]]);
        assert_eq!(grammar.rules[0].location.line, 4);
        assert_eq!(grammar.rules[1].alternatives, vec![vec![nonterminal("stat")]]);
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/Expr.g4");
        let example_parsed = parse_file(&example_path).unwrap();

        assert_eq!(example_parsed.name, "Expr");
        assert_eq!(example_parsed.kind, GrammarKind::Combined);
        assert_eq!(
            example_parsed.rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["prog", "stat", "expr", "atom"]
        );
        assert_eq!(example_parsed.lexer_rules, vec!["ID", "INT", "NEWLINE", "WS", "DIGIT"]);

        assert_eq!(example_parsed.rule("stat").unwrap().alternatives, vec![
            vec![nonterminal("expr"), terminal("NEWLINE")],
            vec![terminal("ID"), terminal("'='"), nonterminal("expr"), terminal("NEWLINE")],
            vec![terminal("NEWLINE")]
        ]);
        assert_eq!(example_parsed.rule("atom").unwrap().alternatives, vec![
            vec![terminal("INT")],
            vec![terminal("ID")],
            vec![terminal("'('"), nonterminal("expr"), terminal("')'")]
        ]);
        assert_eq!(example_parsed.first_rule().unwrap().name, "prog");
    }

    #[test]
    fn parse_malformed_rules() {
        // Missing declaration
        assert_eq!(error_kinds("r : A ;"), vec![(1, CompileErrorType::MissingGrammarDecl)]);

        // Missing colon
        assert_eq!(error_kinds("grammar T;\nr A ;"), vec![(2, CompileErrorType::MissingColon)]);

        // Unclosed group, reported where it opens
        assert_eq!(error_kinds("grammar T;\nr : (A\n| B ;"), vec![(2, CompileErrorType::UnclosedGroup)]);

        // Stray token
        assert_eq!(
            error_kinds("grammar T;\nr : A ) ;"),
            vec![(2, CompileErrorType::MissingSemicolon)]
        );

        // Unterminated rule
        assert_eq!(error_kinds("grammar T;\nr : A"), vec![(2, CompileErrorType::UnexpectedEof)]);

        // Lexer failure
        assert_eq!(error_kinds("grammar T;\n\nr : 'abc ;"), vec![(3, CompileErrorType::UnmatchedQuote)]);
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/Malformed.g4");
        let example_parsed = parse_file(&example_path).unwrap_err();

        assert_eq!(example_parsed, vec![
            CompileError {
                location: Location::at(example_path.clone(), 6, 3),
                error: CompileErrorType::UnexpectedToken("|".to_string())
            },
            CompileError {
                location: Location::at(example_path, 9, 1),
                error: CompileErrorType::MissingRuleName
            }
        ]);
    }

    #[test]
    fn parse_missing_file() {
        let errors = parse_file(Path::new("example_data/does_not_exist.g4")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error,
            CompileErrorType::FileError(std::io::Error::from(std::io::ErrorKind::NotFound))
        );
    }
}
