//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellName`] - A cell's normalized name (e.g., "A1")
//! - [`NameValidator`] - The store-wide rule a name must satisfy
//! - [`CellContent`] - What a cell holds
//! - [`CellValue`] - What a cell evaluates to
//! - [`Cell`] - Name, content and value together

mod name;
mod value;

pub use name::{column_to_letters, letters_to_column, CellName, NameValidator};
pub use value::{CellContent, CellValue};

/// A stored, non-empty cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub name: CellName,
    pub content: CellContent,
    pub value: CellValue,
}

impl Cell {
    pub(crate) fn new(name: CellName, content: CellContent) -> Self {
        Self {
            name,
            content,
            value: CellValue::empty(),
        }
    }
}
