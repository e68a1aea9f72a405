//! Snapshot reading and writing options

use tabula_core::NameValidator;

/// Options for reading a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotReadOptions {
    /// Name rule for the loaded sheet
    ///
    /// When set, this replaces the `IsValid` pattern stored in the file.
    pub validator: Option<NameValidator>,
}

impl SnapshotReadOptions {
    /// Read with an explicit name rule instead of the stored one
    pub fn with_validator(validator: NameValidator) -> Self {
        Self {
            validator: Some(validator),
        }
    }
}

/// Options for writing a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotWriteOptions {
    /// Put each cell on its own indented line
    pub indent: bool,
    /// Spaces per indentation level
    pub indent_width: usize,
}

impl Default for SnapshotWriteOptions {
    fn default() -> Self {
        Self {
            indent: true,
            indent_width: 2,
        }
    }
}
