//! Snapshot writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use tabula_core::Spreadsheet;

use crate::error::SnapshotResult;
use crate::options::SnapshotWriteOptions;

/// Pattern written for sheets whose name rule cannot be stored
const ACCEPT_ALL_PATTERN: &str = ".*";

/// Snapshot writer
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Write a spreadsheet to a file path
    pub fn write_file<P: AsRef<Path>>(sheet: &Spreadsheet, path: P) -> SnapshotResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(sheet, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a spreadsheet to a writer
    pub fn write<W: Write>(sheet: &Spreadsheet, writer: W) -> SnapshotResult<()> {
        Self::write_with_options(sheet, writer, &SnapshotWriteOptions::default())
    }

    /// Write a spreadsheet to a writer with custom options
    ///
    /// Only contents are written, one `<cell>` per non-empty cell in name
    /// order. A predicate name rule has no textual form and is written as the
    /// accept-all pattern.
    pub fn write_with_options<W: Write>(
        sheet: &Spreadsheet,
        writer: W,
        options: &SnapshotWriteOptions,
    ) -> SnapshotResult<()> {
        let mut xml = if options.indent {
            Writer::new_with_indent(writer, b' ', options.indent_width)
        } else {
            Writer::new(writer)
        };

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("spreadsheet");
        let pattern = sheet.validator().pattern().unwrap_or(ACCEPT_ALL_PATTERN);
        root.push_attribute(("IsValid", pattern));
        xml.write_event(Event::Start(root))?;

        for cell in sheet.cells() {
            let contents = cell.content.to_string();
            let mut elem = BytesStart::new("cell");
            elem.push_attribute(("name", cell.name.as_str()));
            elem.push_attribute(("contents", contents.as_str()));
            xml.write_event(Event::Empty(elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("spreadsheet")))?;

        log::debug!("Wrote snapshot with {} cell(s)", sheet.len());
        Ok(())
    }
}
