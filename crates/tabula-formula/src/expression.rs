//! Validated formula expressions

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{FormulaError, FormulaResult};
use crate::parser;

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Parse an operator from its symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    /// Get the symbol for this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A validated formula token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Non-negative numeric literal
    Number(f64),
    /// Normalized variable name
    Variable(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(name) => f.write_str(name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

/// An immutable, syntactically well-formed arithmetic formula
///
/// The grammar is infix with `+ - * /`, parentheses, non-negative numeric
/// literals and variables (a letter followed by letters or digits). There are
/// no unary operators.
///
/// Two expressions are equal when their token sequences are equal. Literals
/// are stored as parsed numbers, so `2.0` and `2` compare equal.
///
/// # Example
/// ```rust
/// use tabula_formula::Expression;
///
/// let expr = Expression::parse("x1 + 2 * y1").unwrap();
/// assert_eq!(expr.to_string(), "x1 + 2 * y1");
///
/// let value = expr.evaluate(|name| match name {
///     "x1" => Some(1.0),
///     "y1" => Some(3.0),
///     _ => None,
/// });
/// assert_eq!(value, Ok(7.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    tokens: Vec<Token>,
    variables: BTreeSet<String>,
}

impl Expression {
    /// Parse a formula, keeping variable names as written
    pub fn parse(text: &str) -> FormulaResult<Self> {
        Self::parse_with(text, |s| s.to_string(), |_| true)
    }

    /// Parse a formula, canonicalizing and checking every variable
    ///
    /// Each variable is passed through `normalize`; the normalized name must
    /// still be a well-formed variable and must satisfy `validate`, otherwise
    /// parsing fails quoting the normalized name.
    pub fn parse_with<N, V>(text: &str, normalize: N, validate: V) -> FormulaResult<Self>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let tokens = parser::parse_tokens(text, &normalize, &validate)?;
        Ok(Self::from_tokens(tokens))
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let variables = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        Self { tokens, variables }
    }

    /// The validated tokens, in source order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct variable names referenced by this formula
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Whether the formula references `name`
    pub fn references(&self, name: &str) -> bool {
        self.variables.contains(name)
    }
}

impl Default for Expression {
    /// The formula `0`
    fn default() -> Self {
        Self::from_tokens(vec![Token::Number(0.0)])
    }
}

impl fmt::Display for Expression {
    /// Space-separated tokens; the result parses back to an equal expression
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Expression {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::parse(s)
    }
}
