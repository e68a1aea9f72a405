//! Cell content and value types

use std::fmt;

use tabula_formula::{EvaluationError, Expression};

/// What a cell holds, as entered
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    /// No content; the cell does not exist
    #[default]
    Empty,

    /// Text stored verbatim
    Text(String),

    /// Numeric literal
    Number(f64),

    /// Validated formula (entered with a leading `=`)
    Formula(Expression),
}

impl CellContent {
    /// Check if the content is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    /// Check if the content is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    /// Get the type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellContent::Empty => "empty",
            CellContent::Text(_) => "text",
            CellContent::Number(_) => "number",
            CellContent::Formula(_) => "formula",
        }
    }
}

impl fmt::Display for CellContent {
    /// The text that, entered again, reproduces this content
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContent::Empty => Ok(()),
            CellContent::Text(s) => f.write_str(s),
            CellContent::Number(n) => write!(f, "{}", n),
            CellContent::Formula(expr) => write!(f, "={}", expr),
        }
    }
}

/// What a cell evaluates to
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text content, or the value of a nonexistent cell (`""`)
    Text(String),

    /// Numeric content or a successful formula result
    Number(f64),

    /// A formula that could not be evaluated
    Error(EvaluationError),
}

impl CellValue {
    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if the value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// The value of a cell with no content
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}
