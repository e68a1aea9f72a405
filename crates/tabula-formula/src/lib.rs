//! # tabula-formula
//!
//! Formula parser and evaluator for tabula.
//!
//! This crate provides:
//! - Formula tokenizing and validation (text → [`Expression`])
//! - Formula evaluation (expression + variable lookup → number)
//! - A general-purpose [`DependencyGraph`] for calculation chains
//!
//! Nothing here knows about cells or sheets; variables are opaque names and
//! their values come from a caller-supplied lookup.
//!
//! ## Example
//!
//! ```rust
//! use tabula_formula::{EvaluationError, Expression};
//!
//! let expr = Expression::parse_with("a1 * (b1 + 2)", |s| s.to_uppercase(), |_| true)?;
//! assert_eq!(expr.to_string(), "A1 * ( B1 + 2 )");
//!
//! let result = expr.evaluate(|name| if name == "A1" { Some(2.0) } else { None });
//! assert_eq!(result, Err(EvaluationError::UndefinedVariable("B1".into())));
//! # Ok::<(), tabula_formula::FormulaError>(())
//! ```

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod lexer;
mod parser;

pub use dependency::DependencyGraph;
pub use error::{EvaluationError, FormulaError, FormulaResult};
pub use evaluator::EvaluationResult;
pub use expression::{Expression, Operator, Token};
