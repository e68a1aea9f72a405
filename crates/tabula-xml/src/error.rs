//! Snapshot error types

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Result type for snapshot operations
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur during snapshot reading/writing
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// XML syntax error
    #[error("XML error: {0}")]
    Xml(quick_xml::Error),

    /// The document is well-formed XML but not a valid spreadsheet
    #[error("Invalid spreadsheet: {0}")]
    Read(String),
}

impl SnapshotError {
    /// Create a new read error with a message
    pub fn read<S: Into<String>>(msg: S) -> Self {
        SnapshotError::Read(msg.into())
    }
}

impl From<quick_xml::Error> for SnapshotError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            // Stream failures are I/O, not malformed XML
            quick_xml::Error::Io(shared) => SnapshotError::Io(
                Arc::try_unwrap(shared).unwrap_or_else(|e| io::Error::new(e.kind(), e.to_string())),
            ),
            other => SnapshotError::Xml(other),
        }
    }
}
