//! # tabula
//!
//! A Rust spreadsheet core.
//!
//! ## Features
//!
//! - Arithmetic formulas over cell names (`+ - * /`, parentheses)
//! - Dependency tracking with circular reference rejection
//! - Recalculation of exactly the cells an edit affects, in dependency order
//! - Full-snapshot XML persistence
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set_content("A1", "10").unwrap();
//! sheet.set_content("A2", "20").unwrap();
//! sheet.set_content("A3", "=A1 + A2").unwrap();
//! assert_eq!(sheet.value("A3").unwrap(), CellValue::Number(30.0));
//!
//! // A cell may not depend on itself, even indirectly
//! assert!(sheet.set_content("A1", "=A3").is_err());
//!
//! // Save to file
//! // sheet.save("budget.xml").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use tabula_core::{
    // Cell types
    Cell,
    CellContent,
    CellName,
    CellValue,
    // Error types
    Error,
    NameValidator,
    Result,
    // Main type
    Spreadsheet,
    // Grid helpers
    column_to_letters,
};

// Re-export formula types
pub use tabula_formula::{
    DependencyGraph, EvaluationError, EvaluationResult, Expression, FormulaError, FormulaResult,
    Operator, Token,
};

// Re-export I/O types
pub use tabula_xml::{
    SnapshotError, SnapshotReadOptions, SnapshotReader, SnapshotResult, SnapshotWriteOptions,
    SnapshotWriter,
};

use std::path::Path;

/// Extension trait for Spreadsheet to add file I/O
pub trait SpreadsheetExt: Sized {
    /// Open a spreadsheet from a snapshot file
    fn open<P: AsRef<Path>>(path: P) -> SnapshotResult<Self>;

    /// Save the spreadsheet to a snapshot file
    ///
    /// On success the sheet no longer reports itself as changed.
    fn save<P: AsRef<Path>>(&mut self, path: P) -> SnapshotResult<()>;
}

impl SpreadsheetExt for Spreadsheet {
    fn open<P: AsRef<Path>>(path: P) -> SnapshotResult<Spreadsheet> {
        SnapshotReader::read_file(path)
    }

    fn save<P: AsRef<Path>>(&mut self, path: P) -> SnapshotResult<()> {
        SnapshotWriter::write_file(self, path)?;
        self.mark_saved();
        Ok(())
    }
}
