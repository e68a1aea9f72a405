//! # tabula-core
//!
//! The cell store for the tabula spreadsheet library.
//!
//! This crate provides:
//! - [`CellName`] and [`NameValidator`] - Cell naming rules
//! - [`CellContent`] and [`CellValue`] - What a cell holds and what it evaluates to
//! - [`Spreadsheet`] - The store itself, which keeps a dependency graph in
//!   step with its formulas and recalculates affected cells on every edit
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellValue, Spreadsheet};
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set_content("A1", "2").unwrap();
//! sheet.set_content("B1", "=a1 * 3").unwrap();
//!
//! let affected = sheet.set_content("A1", "5").unwrap();
//! assert_eq!(affected.len(), 2);
//! assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(15.0));
//! ```

pub mod cell;
pub mod error;
mod recalc;
pub mod spreadsheet;

pub use cell::{column_to_letters, Cell, CellContent, CellName, CellValue, NameValidator};
pub use error::{Error, Result};
pub use spreadsheet::Spreadsheet;

pub use tabula_formula::{EvaluationError, Expression};
