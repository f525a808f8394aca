use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Colon,
    Semi,
    Or,
    LParen,
    RParen,
    Question,
    Star,
    Plus,
    Assign,
    PlusAssign,
    Pound,
    Dot,
    Tilde,
    Range,
    Arrow,
    Comma,
    Lt,
    Gt,
    At,
    Identifier(String),
    // Quotes are kept, so `'x'` stays distinct from the rule `x`
    Literal(String),
    // Contents of `{ ... }` without the outer braces
    Action(String),
    // Contents of `[ ... ]` without the outer brackets
    Argument(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Token::Colon => ":",
            Token::Semi => ";",
            Token::Or => "|",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Question => "?",
            Token::Star => "*",
            Token::Plus => "+",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::Pound => "#",
            Token::Dot => ".",
            Token::Tilde => "~",
            Token::Range => "..",
            Token::Arrow => "->",
            Token::Comma => ",",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::At => "@",
            Token::Identifier(s) | Token::Literal(s) => s.as_str(),
            Token::Action(_) => "{...}",
            Token::Argument(_) => "[...]"
        };
        write!(f, "{}", text)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Position {
    pub line: usize,
    pub column: usize
}

#[derive(PartialEq, Debug, Clone)]
pub struct Lexeme {
    pub token: Token,
    pub position: Position
}

// Character stream that knows where it is in the file
pub struct Chars<'a> {
    rest: std::str::Chars<'a>,
    line: usize,
    column: usize
}

impl<'a> Chars<'a> {
    pub fn new(text: &'a str) -> Self {
        Chars { rest: text.chars(), line: 1, column: 0 }
    }

    // Position of the next character
    pub fn position(&self) -> Position {
        Position { line: self.line, column: self.column + 1 }
    }

    pub fn peek(&self) -> Option<char> {
        self.rest.clone().next()
    }

    pub fn peek_second(&self) -> Option<char> {
        self.rest.clone().nth(1)
    }
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.rest.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

impl PeekingNext for Chars<'_> {
    fn peeking_next<F>(&mut self, accept: F) -> Option<char>
    where
        F: FnOnce(&char) -> bool
    {
        let c = self.peek()?;
        if accept(&c) {
            self.next()
        } else {
            None
        }
    }
}

fn is_identifier_char(c: &char) -> bool {
    c.is_alphanumeric() || *c == '_'
}

pub fn lex_literal(chars: &mut Chars) -> Result<Token> {
    let mut text = String::new();
    // Consume open quote
    chars.next();
    text.push('\'');

    loop {
        match chars.next() {
            Some('\\') => {
                text.push('\\');
                match chars.next() {
                    Some(c) if c != '\n' => text.push(c),
                    _ => return Err(CompileErrorType::UnmatchedQuote)
                }
            }
            Some('\'') => break,
            Some('\n') | None => return Err(CompileErrorType::UnmatchedQuote),
            Some(c) => text.push(c)
        }
    }

    text.push('\'');
    Ok(Token::Literal(text))
}

pub fn lex_identifier(chars: &mut Chars) -> Token {
    Token::Identifier(chars.peeking_take_while(is_identifier_char).collect())
}

// Skips a string inside an action, copying it into `text`
fn copy_quoted(chars: &mut Chars, quote: char, text: &mut String) -> Result<()> {
    text.push(quote);
    chars.next();
    loop {
        match chars.next() {
            Some('\\') => {
                text.push('\\');
                match chars.next() {
                    Some(c) => text.push(c),
                    None => return Err(CompileErrorType::UnclosedAction)
                }
            }
            Some(c) if c == quote => {
                text.push(c);
                return Ok(());
            }
            Some(c) => text.push(c),
            None => return Err(CompileErrorType::UnclosedAction)
        }
    }
}

// Copies a `//` or `/* */` comment inside an action, so quotes in it are not
// taken for strings
fn copy_comment(chars: &mut Chars, text: &mut String) -> Result<()> {
    let block = chars.peek_second() == Some('*');
    // Consume `//` or `/*`
    for _ in 0..2 {
        if let Some(c) = chars.next() {
            text.push(c);
        }
    }
    if !block {
        text.extend(chars.peeking_take_while(|&c| c != '\n'));
        return Ok(());
    }
    while let Some(c) = chars.next() {
        text.push(c);
        if c == '*' && chars.peek() == Some('/') {
            text.push('/');
            chars.next();
            return Ok(());
        }
    }
    Err(CompileErrorType::UnclosedAction)
}

pub fn lex_action(chars: &mut Chars) -> Result<Token> {
    // Consume open brace
    chars.next();
    let mut text = String::new();
    let mut depth = 1;

    while let Some(c) = chars.peek() {
        match c {
            '/' if matches!(chars.peek_second(), Some('/' | '*')) => {
                copy_comment(chars, &mut text)?;
                continue;
            }
            '\'' | '"' => {
                copy_quoted(chars, c, &mut text)?;
                continue;
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    chars.next();
                    return Ok(Token::Action(text));
                }
            }
            _ => {}
        }
        text.push(c);
        chars.next();
    }

    Err(CompileErrorType::UnclosedAction)
}

// Argument blocks and lexer character sets both end at the first unescaped `]`
pub fn lex_argument(chars: &mut Chars) -> Result<Token> {
    // Consume open bracket
    chars.next();
    let mut text = String::new();

    loop {
        match chars.next() {
            Some('\\') => {
                text.push('\\');
                match chars.next() {
                    Some(c) => text.push(c),
                    None => return Err(CompileErrorType::UnclosedArgument)
                }
            }
            Some(']') => return Ok(Token::Argument(text)),
            Some(c) => text.push(c),
            None => return Err(CompileErrorType::UnclosedArgument)
        }
    }
}

fn skip_line_comment(chars: &mut Chars) {
    chars.peeking_take_while(|&c| c != '\n').for_each(drop);
}

fn skip_block_comment(chars: &mut Chars) -> Result<()> {
    // Consume `/*`
    chars.next();
    chars.next();
    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some('/') {
            chars.next();
            return Ok(());
        }
    }
    Err(CompileErrorType::UnclosedComment)
}

fn lex_punctuation(chars: &mut Chars) -> Result<Token> {
    let c = chars.next().ok_or(CompileErrorType::UnexpectedEof)?;
    let token = match c {
        ':' => Token::Colon,
        ';' => Token::Semi,
        '|' => Token::Or,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '?' => Token::Question,
        '*' => Token::Star,
        '+' if chars.peeking_next(|&c| c == '=').is_some() => Token::PlusAssign,
        '+' => Token::Plus,
        '=' => Token::Assign,
        '#' => Token::Pound,
        '.' if chars.peeking_next(|&c| c == '.').is_some() => Token::Range,
        '.' => Token::Dot,
        '~' => Token::Tilde,
        '-' if chars.peeking_next(|&c| c == '>').is_some() => Token::Arrow,
        ',' => Token::Comma,
        '<' => Token::Lt,
        '>' => Token::Gt,
        '@' => Token::At,
        other => return Err(CompileErrorType::UnexpectedCharacter(other))
    };
    Ok(token)
}

// Splits a whole grammar file into tokens. Lexing stops at the first error
// because nothing after an unclosed quote or brace can be trusted
pub fn lex(text: &str) -> std::result::Result<Vec<Lexeme>, (CompileErrorType, Position)> {
    let mut lexemes = Vec::new();
    let mut chars = Chars::new(text);

    while let Some(c) = chars.peek() {
        let position = chars.position();
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '/' if chars.peek_second() == Some('/') => {
                skip_line_comment(&mut chars);
                continue;
            }
            '/' if chars.peek_second() == Some('*') => {
                skip_block_comment(&mut chars).map_err(|e| (e, position))?;
                continue;
            }
            '\'' => lex_literal(&mut chars),
            '{' => lex_action(&mut chars),
            '[' => lex_argument(&mut chars),
            c if is_identifier_char(&c) => Ok(lex_identifier(&mut chars)),
            _ => lex_punctuation(&mut chars)
        }.map_err(|e| (e, position))?;

        lexemes.push(Lexeme { token, position });
    }

    Ok(lexemes)
}
