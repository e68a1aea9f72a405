//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula contained no tokens at all
    #[error("Formula is empty")]
    Empty,

    /// Text that matches none of the token patterns
    #[error("'{0}' is an invalid token")]
    InvalidToken(String),

    /// A token appeared somewhere the grammar does not allow it
    #[error("Unexpected token '{token}': {reason}")]
    UnexpectedToken { token: String, reason: &'static str },

    /// Closing parenthesis without a matching opening one
    #[error("Unmatched closing parenthesis")]
    UnmatchedParenthesis,

    /// Opening and closing parenthesis counts differ
    #[error("Unbalanced parentheses: {open} opening, {close} closing")]
    UnbalancedParentheses { open: usize, close: usize },

    /// A normalized variable no longer looks like a variable
    #[error("Normalized variable '{0}' is not a well-formed variable name")]
    MalformedVariable(String),

    /// A normalized variable was refused by the caller's validator
    #[error("Normalized variable '{0}' was rejected by the validator")]
    RejectedVariable(String),
}

/// Errors produced while evaluating a well-formed formula
///
/// These are value-level outcomes: callers that store formula results are
/// expected to keep them as data rather than abort on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The lookup had no numeric value for a variable
    #[error("Cannot map a value to the variable '{0}'")]
    UndefinedVariable(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
}
