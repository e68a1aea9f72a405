//! Error types for tabula-core

use tabula_formula::FormulaError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tabula-core
///
/// Every variant is raised before the store is modified, so a failed call
/// leaves the spreadsheet exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Cell name is malformed or refused by the name validator
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    /// Name validator pattern failed to compile
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(String),

    /// Formula parse error
    #[error("Formula parse error: {0}")]
    FormulaParse(#[from] FormulaError),

    /// Circular reference detected
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(String),
}
