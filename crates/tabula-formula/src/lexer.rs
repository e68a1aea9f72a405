//! Formula lexer
//!
//! Splits formula text into lexemes. Whitespace separates lexemes and is never
//! returned. Any stretch of text that matches none of the token patterns is
//! returned as [`Lexeme::Invalid`] so the parser can report it verbatim.

use regex::Regex;
use std::sync::OnceLock;

use crate::expression::Operator;

/// A raw piece of formula text, classified by the pattern it matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme<'a> {
    LeftParen,
    RightParen,
    Operator(Operator),
    /// Letter followed by letters or digits
    Identifier(&'a str),
    /// Unsigned decimal literal with optional `e` exponent
    Number(&'a str),
    /// Text matching no pattern
    Invalid(&'a str),
}

impl<'a> Lexeme<'a> {
    /// The source text of this lexeme
    pub fn text(&self) -> &'a str {
        match self {
            Lexeme::LeftParen => "(",
            Lexeme::RightParen => ")",
            Lexeme::Operator(op) => op.symbol(),
            Lexeme::Identifier(s) | Lexeme::Number(s) | Lexeme::Invalid(s) => s,
        }
    }
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?x)
              (?P<lparen>\()
            | (?P<rparen>\))
            | (?P<op>[-+*/])
            | (?P<ident>[a-zA-Z][0-9a-zA-Z]*)
            | (?P<number>(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:e[-+]?[0-9]+)?)
            | (?P<space>\s+)
            ",
        )
        .expect("formula token regex must compile")
    })
}

fn identifier_re() -> &'static Regex {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][0-9a-zA-Z]*$").expect("identifier regex must compile")
    })
}

/// Check whether `text` is a complete, well-formed variable name
pub fn is_identifier(text: &str) -> bool {
    identifier_re().is_match(text)
}

/// Split formula text into lexemes
///
/// # Example
/// ```rust
/// use tabula_formula::lexer::{tokenize, Lexeme};
///
/// let lexemes = tokenize("x1 * (2.5e3 - y)");
/// assert_eq!(lexemes.len(), 7);
/// assert_eq!(lexemes[2], Lexeme::LeftParen);
/// assert_eq!(lexemes[3], Lexeme::Number("2.5e3"));
/// ```
pub fn tokenize(text: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut last = 0;

    for caps in token_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_invalid(&mut lexemes, &text[last..whole.start()]);
        last = whole.end();

        let lexeme = if caps.name("lparen").is_some() {
            Lexeme::LeftParen
        } else if caps.name("rparen").is_some() {
            Lexeme::RightParen
        } else if let Some(m) = caps.name("op") {
            match Operator::from_symbol(m.as_str()) {
                Some(op) => Lexeme::Operator(op),
                None => Lexeme::Invalid(m.as_str()),
            }
        } else if let Some(m) = caps.name("ident") {
            Lexeme::Identifier(m.as_str())
        } else if let Some(m) = caps.name("number") {
            Lexeme::Number(m.as_str())
        } else {
            // whitespace
            continue;
        };
        lexemes.push(lexeme);
    }
    push_invalid(&mut lexemes, &text[last..]);

    lexemes
}

fn push_invalid<'a>(lexemes: &mut Vec<Lexeme<'a>>, gap: &'a str) {
    if !gap.is_empty() {
        lexemes.push(Lexeme::Invalid(gap));
    }
}
