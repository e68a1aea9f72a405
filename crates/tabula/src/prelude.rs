//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellContent,
    CellName,
    CellValue,
    // Error types
    Error,
    EvaluationError,
    Expression,
    NameValidator,
    Result,
    // Main type
    Spreadsheet,
    // Extension traits
    SpreadsheetExt,
    // I/O types
    SnapshotReader,
    SnapshotWriter,
};
