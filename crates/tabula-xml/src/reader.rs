//! Snapshot reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashSet;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use tabula_core::{CellName, NameValidator, Spreadsheet};

use crate::error::{SnapshotError, SnapshotResult};
use crate::options::SnapshotReadOptions;

/// Name rule and cell records of a parsed snapshot, not yet replayed
#[derive(Debug, Default)]
struct Document {
    is_valid: Option<String>,
    cells: Vec<(String, String)>,
}

/// Snapshot reader
pub struct SnapshotReader;

impl SnapshotReader {
    /// Read a spreadsheet from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> SnapshotResult<Spreadsheet> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a spreadsheet from a reader
    pub fn read<R: BufRead>(reader: R) -> SnapshotResult<Spreadsheet> {
        Self::read_with_options(reader, &SnapshotReadOptions::default())
    }

    /// Read a spreadsheet from a reader with custom options
    ///
    /// The whole document is parsed and checked before any cell is replayed,
    /// so nothing is built from a document that turns out to be malformed.
    /// The returned sheet reports [`Spreadsheet::changed`] as `false`.
    pub fn read_with_options<R: BufRead>(
        reader: R,
        options: &SnapshotReadOptions,
    ) -> SnapshotResult<Spreadsheet> {
        let document = Self::parse_document(reader)?;

        let validator = match (&options.validator, &document.is_valid) {
            (Some(validator), _) => validator.clone(),
            (None, Some(pattern)) => NameValidator::pattern_from_str(pattern)
                .map_err(|e| SnapshotError::read(format!("IsValid: {}", e)))?,
            (None, None) => NameValidator::AcceptAll,
        };

        Self::replay(document.cells, validator)
    }

    /// Parse the XML into a [`Document`], enforcing the snapshot schema
    fn parse_document<R: BufRead>(reader: R) -> SnapshotResult<Document> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut document = Document::default();
        let mut seen_root = false;
        // 0 = outside the root, 1 = inside <spreadsheet>, 2 = inside <cell>
        let mut depth = 0usize;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    Self::open_element(&e, depth, &mut seen_root, &mut document)?;
                    depth += 1;
                }
                Event::Empty(e) => {
                    Self::open_element(&e, depth, &mut seen_root, &mut document)?;
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    if !text.trim().is_empty() {
                        return Err(SnapshotError::read(format!(
                            "unexpected text '{}'",
                            text.trim()
                        )));
                    }
                }
                Event::CData(_) => {
                    return Err(SnapshotError::read("unexpected CDATA section"));
                }
                Event::Eof => break,
                // Declaration, comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        if depth != 0 {
            return Err(SnapshotError::read("unexpected end of document"));
        }
        if !seen_root {
            return Err(SnapshotError::read("missing <spreadsheet> element"));
        }

        Ok(document)
    }

    /// Check an element opened at `depth` and record what it carries
    fn open_element(
        e: &BytesStart<'_>,
        depth: usize,
        seen_root: &mut bool,
        document: &mut Document,
    ) -> SnapshotResult<()> {
        let name = e.name();
        let tag = String::from_utf8_lossy(name.as_ref());

        match (depth, name.as_ref()) {
            (0, b"spreadsheet") if !*seen_root => {
                *seen_root = true;
                document.is_valid = Self::attribute(e, b"IsValid")?;
                Ok(())
            }
            (0, _) if *seen_root => Err(SnapshotError::read(format!(
                "unexpected <{}> after the root element",
                tag
            ))),
            (0, _) => Err(SnapshotError::read(format!(
                "root element must be <spreadsheet>, found <{}>",
                tag
            ))),
            (1, b"cell") => {
                let cell_name = Self::attribute(e, b"name")?
                    .ok_or_else(|| SnapshotError::read("<cell> is missing the 'name' attribute"))?;
                let contents = Self::attribute(e, b"contents")?.ok_or_else(|| {
                    SnapshotError::read(format!(
                        "<cell name=\"{}\"> is missing the 'contents' attribute",
                        cell_name
                    ))
                })?;
                document.cells.push((cell_name, contents));
                Ok(())
            }
            (1, _) => Err(SnapshotError::read(format!(
                "unexpected <{}> inside <spreadsheet>",
                tag
            ))),
            _ => Err(SnapshotError::read(format!(
                "unexpected <{}> inside <cell>",
                tag
            ))),
        }
    }

    /// Unescaped value of the attribute `key`, if present
    fn attribute(e: &BytesStart<'_>, key: &[u8]) -> SnapshotResult<Option<String>> {
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
            if attr.key.as_ref() == key {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    /// Build the sheet by entering every record in document order
    fn replay(cells: Vec<(String, String)>, validator: NameValidator) -> SnapshotResult<Spreadsheet> {
        let mut sheet = Spreadsheet::with_validator(validator);
        let mut seen = AHashSet::new();

        for (name, contents) in cells {
            let normalized = CellName::parse_with(&name, sheet.validator()).map_err(|e| {
                log::warn!("Rejected snapshot record {}: {}", name, e);
                SnapshotError::read(e.to_string())
            })?;
            if !seen.insert(normalized.clone()) {
                log::warn!("Rejected duplicate snapshot record {}", normalized);
                return Err(SnapshotError::read(format!("duplicate cell {}", normalized)));
            }

            sheet.set_content(normalized.as_str(), &contents).map_err(|e| {
                log::warn!("Rejected snapshot record {}: {}", normalized, e);
                SnapshotError::read(format!("cell {}: {}", normalized, e))
            })?;
        }

        log::debug!("Loaded snapshot with {} cell(s)", sheet.len());
        sheet.mark_saved();
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_core::{CellContent, CellValue};

    fn read(xml: &str) -> SnapshotResult<Spreadsheet> {
        SnapshotReader::read(xml.as_bytes())
    }

    fn read_error(xml: &str) -> String {
        match read(xml) {
            Err(SnapshotError::Read(msg)) => msg,
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_basic() {
        let sheet = read(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <spreadsheet IsValid="^[A-Z]+[0-9]+$">
              <cell name="A1" contents="5" />
              <cell name="b1" contents="=a1 * 2"></cell>
              <cell name="C1" contents="x &amp; y" />
            </spreadsheet>"#,
        )
        .unwrap();

        assert!(!sheet.changed());
        assert_eq!(sheet.validator().pattern(), Some("^[A-Z]+[0-9]+$"));
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(10.0));
        assert_eq!(sheet.content("C1").unwrap(), CellContent::Text("x & y".into()));
    }

    #[test]
    fn test_forward_references_resolve() {
        let sheet = read(
            r#"<spreadsheet>
              <cell name="A1" contents="=B1 + 1" />
              <cell name="B1" contents="2" />
            </spreadsheet>"#,
        )
        .unwrap();
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(3.0));
    }

    #[test]
    fn test_empty_root() {
        let sheet = read("<spreadsheet/>").unwrap();
        assert!(sheet.is_empty());
        assert_eq!(sheet.validator().pattern(), None);
    }

    #[test]
    fn test_schema_violations() {
        assert!(read_error("<sheet/>").contains("<sheet>"));
        assert!(read_error("<spreadsheet><row/></spreadsheet>").contains("<row>"));
        assert!(read_error(r#"<spreadsheet><cell name="A1"/></spreadsheet>"#).contains("contents"));
        assert!(read_error(r#"<spreadsheet><cell contents="1"/></spreadsheet>"#).contains("name"));
        assert!(read_error(
            r#"<spreadsheet><cell name="A1" contents="1"><x/></cell></spreadsheet>"#
        )
        .contains("<x>"));
        assert!(read_error("<spreadsheet>hello</spreadsheet>").contains("hello"));
        assert!(read_error("<spreadsheet/><spreadsheet/>").contains("after the root"));
        assert!(read_error("").contains("missing"));
        assert!(read("<spreadsheet>").is_err());
    }

    #[test]
    fn test_schema_checked_before_replay() {
        let msg = read_error(r#"<spreadsheet><cell name="A1" contents="=A1"/><bogus/></spreadsheet>"#);
        assert!(msg.contains("<bogus>"), "{msg}");
        assert!(!msg.contains("ircular"), "{msg}");

        let msg = read_error(
            r#"<spreadsheet IsValid="^A"><cell name="B1" contents="1"/><cell name="A1"/></spreadsheet>"#,
        );
        assert!(msg.contains("contents"), "{msg}");
    }

    #[test]
    fn test_invalid_is_valid_pattern() {
        assert!(read_error(r#"<spreadsheet IsValid="(["/>"#).contains("IsValid"));
    }

    #[test]
    fn test_replay_failures() {
        let duplicate = r#"<spreadsheet>
            <cell name="A1" contents="1"/><cell name="a1" contents="2"/>
        </spreadsheet>"#;
        assert!(read_error(duplicate).contains("duplicate cell A1"));

        let circular = r#"<spreadsheet>
            <cell name="A1" contents="=B1"/><cell name="B1" contents="=A1"/>
        </spreadsheet>"#;
        assert!(read_error(circular).contains("Circular"));

        let malformed = r#"<spreadsheet><cell name="A1" contents="=1 +"/></spreadsheet>"#;
        assert!(read_error(malformed).contains("A1"));

        let invalid_name = r#"<spreadsheet IsValid="^A"><cell name="B1" contents="1"/></spreadsheet>"#;
        assert!(read_error(invalid_name).contains("B1"));
    }

    #[test]
    fn test_validator_override() {
        let xml = r#"<spreadsheet IsValid="^A"><cell name="B1" contents="1"/></spreadsheet>"#;
        let options = SnapshotReadOptions::with_validator(NameValidator::AcceptAll);
        let sheet = SnapshotReader::read_with_options(xml.as_bytes(), &options).unwrap();
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(1.0));
    }

    struct Unreadable;

    impl std::io::Read for Unreadable {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_stream_failure_is_io_error() {
        match SnapshotReader::read(BufReader::new(Unreadable)) {
            Err(SnapshotError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            read("<spreadsheet></cell>"),
            Err(SnapshotError::Xml(_))
        ));
    }
}
