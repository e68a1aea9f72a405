//! Formula validator
//!
//! Walks the lexemes left to right, checking each one against the category of
//! the token before it. The grammar is small enough that this replaces a full
//! parse tree: a sequence accepted here is always evaluable by the stack
//! machine in [`crate::evaluator`].

use crate::error::{FormulaError, FormulaResult};
use crate::expression::Token;
use crate::lexer::{self, Lexeme};

const AFTER_OPERAND: &str = "must be preceded by an operator or an opening parenthesis";
const AFTER_VALUE: &str = "must be preceded by a literal, a variable or a closing parenthesis";
const FIRST: &str = "the first token must be a literal, a variable or an opening parenthesis";
const LAST: &str = "the last token must be a literal, a variable or a closing parenthesis";

/// Category of the previously accepted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Start,
    /// Literal or variable
    Operand,
    Operator,
    LeftParen,
    RightParen,
}

impl Previous {
    /// Literals, variables and `(` may follow
    fn accepts_operand(self) -> bool {
        matches!(self, Previous::Start | Previous::Operator | Previous::LeftParen)
    }

    /// Operators and `)` may follow
    fn accepts_operator(self) -> bool {
        matches!(self, Previous::Operand | Previous::RightParen)
    }
}

fn unexpected(token: &str, previous: Previous, reason: &'static str) -> FormulaError {
    let reason = if previous == Previous::Start { FIRST } else { reason };
    FormulaError::UnexpectedToken {
        token: token.to_string(),
        reason,
    }
}

/// Validate `text` and produce its token sequence
pub(crate) fn parse_tokens(
    text: &str,
    normalize: &dyn Fn(&str) -> String,
    validate: &dyn Fn(&str) -> bool,
) -> FormulaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut previous = Previous::Start;
    let mut last_text = "";
    let mut open = 0usize;
    let mut close = 0usize;

    for lexeme in lexer::tokenize(text) {
        let token = match lexeme {
            Lexeme::Invalid(s) => return Err(FormulaError::InvalidToken(s.to_string())),

            Lexeme::Number(s) => {
                if !previous.accepts_operand() {
                    return Err(unexpected(s, previous, AFTER_OPERAND));
                }
                previous = Previous::Operand;
                Token::Number(parse_literal(s)?)
            }

            Lexeme::Identifier(s) => {
                if !previous.accepts_operand() {
                    return Err(unexpected(s, previous, AFTER_OPERAND));
                }
                previous = Previous::Operand;
                Token::Variable(normalize_variable(s, normalize, validate)?)
            }

            Lexeme::Operator(op) => {
                if !previous.accepts_operator() {
                    return Err(unexpected(op.symbol(), previous, AFTER_VALUE));
                }
                previous = Previous::Operator;
                Token::Operator(op)
            }

            Lexeme::LeftParen => {
                if !previous.accepts_operand() {
                    return Err(unexpected("(", previous, AFTER_OPERAND));
                }
                previous = Previous::LeftParen;
                open += 1;
                Token::LeftParen
            }

            Lexeme::RightParen => {
                if !previous.accepts_operator() {
                    return Err(unexpected(")", previous, AFTER_VALUE));
                }
                if close >= open {
                    return Err(FormulaError::UnmatchedParenthesis);
                }
                previous = Previous::RightParen;
                close += 1;
                Token::RightParen
            }
        };
        last_text = lexeme.text();
        tokens.push(token);
    }

    if previous == Previous::Start {
        return Err(FormulaError::Empty);
    }
    if !previous.accepts_operator() {
        return Err(FormulaError::UnexpectedToken {
            token: last_text.to_string(),
            reason: LAST,
        });
    }
    if open != close {
        return Err(FormulaError::UnbalancedParentheses { open, close });
    }

    Ok(tokens)
}

fn parse_literal(text: &str) -> FormulaResult<f64> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FormulaError::InvalidToken(text.to_string())),
    }
}

fn normalize_variable(
    raw: &str,
    normalize: &dyn Fn(&str) -> String,
    validate: &dyn Fn(&str) -> bool,
) -> FormulaResult<String> {
    let normalized = normalize(raw);
    if !lexer::is_identifier(&normalized) {
        return Err(FormulaError::MalformedVariable(normalized));
    }
    if !validate(&normalized) {
        return Err(FormulaError::RejectedVariable(normalized));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use crate::error::FormulaError;
    use crate::Expression;

    fn parse_err(text: &str) -> FormulaError {
        Expression::parse(text).unwrap_err()
    }

    #[test]
    fn test_accepts_well_formed() {
        for text in [
            "1",
            "x",
            "(1)",
            "((x))",
            "1 + 2 * 3",
            "(a1 + b1) / (c1 - 2.5e3)",
            "x1*y2-z3/4",
        ] {
            assert!(Expression::parse(text).is_ok(), "{text} should parse");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(parse_err(""), FormulaError::Empty);
        assert_eq!(parse_err("   "), FormulaError::Empty);
    }

    #[test]
    fn test_rejects_bad_first_token() {
        assert!(matches!(parse_err("+1"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err(")"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("-5"), FormulaError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_rejects_adjacent_operands() {
        assert!(matches!(parse_err("1 2"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("x y"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("2x"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("(1)(2)"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("3(2)"), FormulaError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_rejects_adjacent_operators() {
        assert!(matches!(parse_err("1 + * 2"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("1 * -2"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("(+1)"), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(parse_err("(1+)"), FormulaError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_rejects_bad_last_token() {
        match parse_err("1 +") {
            FormulaError::UnexpectedToken { token, .. } => assert_eq!(token, "+"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(parse_err("(1 + ("), FormulaError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_rejects_unbalanced_parentheses() {
        assert_eq!(parse_err("(1 + 2"), FormulaError::UnbalancedParentheses { open: 1, close: 0 });
        assert_eq!(parse_err("1 + 2)"), FormulaError::UnmatchedParenthesis);
        assert_eq!(parse_err("(1))"), FormulaError::UnmatchedParenthesis);
    }

    #[test]
    fn test_rejects_invalid_tokens() {
        assert_eq!(parse_err("1 & 2"), FormulaError::InvalidToken("&".into()));
        assert_eq!(parse_err("a_1"), FormulaError::InvalidToken("_".into()));
        assert_eq!(parse_err("1e999"), FormulaError::InvalidToken("1e999".into()));
    }

    #[test]
    fn test_normalizer_and_validator() {
        let expr =
            Expression::parse_with("a1 + b2", |s| s.to_uppercase(), |s| s.starts_with('A') || s == "B2")
                .unwrap();
        assert_eq!(expr.to_string(), "A1 + B2");

        let err = Expression::parse_with("a1 + c2", |s| s.to_uppercase(), |s| s != "C2").unwrap_err();
        assert_eq!(err, FormulaError::RejectedVariable("C2".into()));

        let err = Expression::parse_with("a1", |s| format!("_{s}"), |_| true).unwrap_err();
        assert_eq!(err, FormulaError::MalformedVariable("_a1".into()));
    }
}
