//! # tabula-xml
//!
//! Full-snapshot XML reader and writer for tabula spreadsheets.
//!
//! A snapshot stores the name rule and the content of every non-empty cell:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <spreadsheet IsValid="^[A-Z]+[0-9]+$">
//!   <cell name="A1" contents="5"/>
//!   <cell name="B1" contents="=A1 * 2"/>
//! </spreadsheet>
//! ```
//!
//! Values are not stored; loading replays every cell through
//! [`Spreadsheet::set_content`](tabula_core::Spreadsheet::set_content).

pub mod error;
pub mod options;
pub mod reader;
pub mod writer;

pub use error::{SnapshotError, SnapshotResult};
pub use options::{SnapshotReadOptions, SnapshotWriteOptions};
pub use reader::SnapshotReader;
pub use writer::SnapshotWriter;
