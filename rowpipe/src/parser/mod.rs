//! Delimited-text source.
//!
//! Reads a byte stream in a configured charset, splits each line with the
//! quote-aware rule in [`split`], names cells through a per-source
//! [`HeaderRegistry`] and produces one [`Row`] per non-empty line.
//!
//! Cells are stored verbatim as strings; empty cells become explicit nulls.
//!
//! # Example
//!
//! ```rust,ignore
//! use rowpipe::{CsvStreamSource, Source};
//!
//! let input = "name,age\nduke,42\n";
//! let mut source = CsvStreamSource::new(input.as_bytes(), ",", "UTF-8", true)?;
//! let rows = source.query(None, &[])?;
//! assert_eq!(rows[0].get_column_by_name("name").unwrap().value().as_str(), Some("duke"));
//! ```

pub mod charset;
pub mod headers;
pub mod split;

use std::io::Read;

use encoding_rs::Encoding;

use crate::error::{ConfigError, SourceResult};
use crate::logs::{log_info, log_warning};
use crate::models::{CellValue, Row};
use crate::source::Source;

pub use charset::{decode, detect_charset, resolve_charset, resolve_or_detect, AUTO_CHARSET};
pub use headers::HeaderRegistry;
pub use split::{split_line, split_lines};

/// Outcome of parsing one line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A data row.
    Row(Row),
    /// The header line, carrying its cells as a row.
    Header(Row),
    /// The line produced no segments.
    Skipped,
}

/// Source over delimited text.
///
/// The stream is read and decoded at construction; rows are parsed on the
/// first [`Source::query`] and cached for every later call.
#[derive(Debug)]
pub struct CsvStreamSource {
    delimiter: String,
    encoding: &'static Encoding,
    contains_headers: bool,
    emit_header_row: bool,
    pending_headers: bool,
    text: Option<String>,
    headers: HeaderRegistry,
    rows: Option<Vec<Row>>,
    skipped: Vec<usize>,
}

impl CsvStreamSource {
    /// Read `reader` to the end and decode it with `charset`.
    ///
    /// Fails with a configuration error for an empty delimiter or an
    /// unknown charset, and with an IO error if the stream is unreadable.
    /// `charset` may be [`AUTO_CHARSET`] to detect it from the bytes.
    /// The reader is not closed here; its owner releases it.
    pub fn new<R: Read>(
        mut reader: R,
        delimiter: &str,
        charset: &str,
        contains_headers: bool,
    ) -> SourceResult<Self> {
        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter.into());
        }
        let explicit = if charset.trim().eq_ignore_ascii_case(AUTO_CHARSET) {
            None
        } else {
            Some(resolve_charset(charset)?)
        };

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let encoding = match explicit {
            Some(encoding) => encoding,
            None => resolve_or_detect(charset, &bytes)?,
        };
        log_info(format!("Decoding {} bytes as {}", bytes.len(), encoding.name()));

        Ok(Self {
            delimiter: delimiter.to_string(),
            encoding,
            contains_headers,
            emit_header_row: false,
            pending_headers: contains_headers,
            text: Some(decode(&bytes, encoding)),
            headers: HeaderRegistry::new(),
            rows: None,
            skipped: Vec::new(),
        })
    }

    /// Also produce the header line as the first data row.
    pub fn emit_header_row(mut self, emit: bool) -> Self {
        self.emit_header_row = emit;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Canonical name of the charset in use.
    pub fn charset(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn contains_headers(&self) -> bool {
        self.contains_headers
    }

    pub fn headers(&self) -> &HeaderRegistry {
        &self.headers
    }

    /// 1-based numbers of lines that produced no row.
    pub fn skipped_lines(&self) -> &[usize] {
        &self.skipped
    }

    /// Parse one line, updating the header registry.
    pub fn parse_line(&mut self, line: &str) -> ParsedLine {
        let segments = split_line(line, &self.delimiter);
        if segments.is_empty() {
            return ParsedLine::Skipped;
        }

        let mut row = Row::new();
        if self.pending_headers {
            self.pending_headers = false;
            for (index, cell) in segments.iter().enumerate() {
                self.headers.declare(index, cell);
                cell_to_row(&mut row, index, cell, cell);
            }
            return ParsedLine::Header(row);
        }

        for (index, cell) in segments.iter().enumerate() {
            let name = self.headers.name_for(index);
            cell_to_row(&mut row, index, name, cell);
        }
        ParsedLine::Row(row)
    }

    fn parse_all(&mut self) -> Vec<Row> {
        let text = self.text.take().unwrap_or_default();
        let mut rows = Vec::new();
        let mut line_count = 0;

        for (line_idx, line) in split_lines(&text).into_iter().enumerate() {
            line_count += 1;
            match self.parse_line(line) {
                ParsedLine::Row(row) => rows.push(row),
                ParsedLine::Header(row) => {
                    if self.emit_header_row {
                        rows.push(row);
                    }
                }
                ParsedLine::Skipped => self.skipped.push(line_idx + 1),
            }
        }

        log_info(format!("Parsed {} lines into {} rows", line_count, rows.len()));
        if !self.skipped.is_empty() {
            log_warning(format!(
                "{} lines skipped (no cells): {:?}",
                self.skipped.len(),
                self.skipped
            ));
        }
        rows
    }
}

impl Source for CsvStreamSource {
    fn query(&mut self, query: Option<&str>, params: &[CellValue]) -> SourceResult<&[Row]> {
        if query.is_some() || !params.is_empty() {
            log_warning("Delimited-text source ignores query text and parameters");
        }
        let rows = match self.rows.take() {
            Some(rows) => rows,
            None => self.parse_all(),
        };
        Ok(self.rows.insert(rows).as_slice())
    }
}

fn cell_to_row(row: &mut Row, index: usize, name: &str, cell: &str) {
    if cell.is_empty() {
        row.add_null_column(index, name);
    } else {
        row.add_column(index, name, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use std::io;

    fn source(input: &str, headers: bool) -> CsvStreamSource {
        CsvStreamSource::new(input.as_bytes(), ",", "UTF-8", headers).unwrap()
    }

    fn value<'a>(row: &'a Row, name: &str) -> &'a CellValue {
        row.get_column_by_name(name).unwrap().value()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_headers_name_data_rows() {
        let mut src = source("name,age\nduke,42\nmasha,7\n", true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(value(&rows[0], "name"), &CellValue::String("duke".into()));
        assert_eq!(value(&rows[0], "age"), &CellValue::String("42".into()));
        assert_eq!(value(&rows[1], "name").as_str(), Some("masha"));
        assert_eq!(rows[1].column_names(), vec!["name", "age"]);
    }

    #[test]
    fn test_emit_header_row_keeps_header_line_as_data() {
        let mut src = source("name,age\nduke,42\n", true).emit_header_row(true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(value(&rows[0], "name").as_str(), Some("name"));
        assert_eq!(value(&rows[0], "age").as_str(), Some("age"));
        assert_eq!(value(&rows[1], "name").as_str(), Some("duke"));
    }

    #[test]
    fn test_without_headers_names_are_indices() {
        let mut src = source("duke,42\nmasha,7,extra\n", false);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows[0].column_names(), vec!["0", "1"]);
        assert_eq!(value(&rows[1], "2").as_str(), Some("extra"));
        assert_eq!(src.headers().names(), &["0", "1", "2"]);
    }

    #[test]
    fn test_wider_data_line_extends_declared_headers() {
        let mut src = source("a,b\n1,2,3\n", true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows[0].column_names(), vec!["a", "b", "2"]);
        assert_eq!(src.headers().names(), &["a", "b", "2"]);
    }

    #[test]
    fn test_empty_cells_are_explicit_nulls() {
        let mut src = source("a,b,c\n1,,\n", true);
        let rows = src.query(None, &[]).unwrap();

        let b = rows[0].get_column_by_name("b").unwrap();
        assert!(b.is_null());
        assert_eq!(b.value().as_str(), None);
        assert!(rows[0].get_column_by_name("c").unwrap().is_null());
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_quoted_cells_stored_verbatim() {
        let mut src = source("who,greeting\nduke,\"Hello, World\"\n", true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(value(&rows[0], "greeting").as_str(), Some("\"Hello, World\""));
    }

    #[test]
    fn test_empty_lines_are_skipped_and_recorded() {
        let mut src = source("a,b\n1,2\n\n3,4\n", true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(value(&rows[1], "a").as_str(), Some("3"));
        assert_eq!(src.skipped_lines(), &[3]);
    }

    #[test]
    fn test_leading_empty_line_does_not_consume_header() {
        let mut src = source("\nname\nduke\n", true);
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(value(&rows[0], "name").as_str(), Some("duke"));
        assert_eq!(src.skipped_lines(), &[1]);
    }

    #[test]
    fn test_query_is_memoized() {
        let mut src = source("a\n1\n2\n", true);
        let first = src.query(None, &[]).unwrap().to_vec();
        let second = src.query(None, &[]).unwrap().to_vec();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_arguments_ignored() {
        let mut src = source("a\n1\n", true);
        let rows = src
            .query(Some("select * from nowhere"), &[CellValue::Integer(1)])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut src = source("a,b\r\n1,2\r\n", true);
        let rows = src.query(None, &[]).unwrap();
        assert_eq!(value(&rows[0], "b").as_str(), Some("2"));
    }

    #[test]
    fn test_lone_cr_line_endings() {
        let mut src = source("a,b\r1,2\r3,4\r", true);
        let rows = src.query(None, &[]).unwrap().to_vec();

        assert_eq!(rows.len(), 2);
        assert_eq!(value(&rows[0], "b").as_str(), Some("2"));
        assert_eq!(value(&rows[1], "a").as_str(), Some("3"));
        assert_eq!(src.headers().names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_replacement_only_charset_rejected() {
        for label in ["ISO-2022-KR", "hz-gb-2312"] {
            let err = CsvStreamSource::new("name,age\nduke,42\n".as_bytes(), ",", label, true).unwrap_err();
            assert!(matches!(err, SourceError::Config(ConfigError::UnknownCharset(_))), "{}", label);
        }
    }

    #[test]
    fn test_custom_delimiter_and_charset() {
        // "Société;Ville" / "Éole;Brest" in ISO-8859-1
        let mut bytes = vec![0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        bytes.extend_from_slice(b";Ville\n");
        bytes.push(0xC9);
        bytes.extend_from_slice(b"ole;Brest\n");

        let mut src = CsvStreamSource::new(bytes.as_slice(), ";", "ISO-8859-1", true).unwrap();
        let rows = src.query(None, &[]).unwrap();

        assert_eq!(value(&rows[0], "Société").as_str(), Some("Éole"));
        assert_eq!(value(&rows[0], "Ville").as_str(), Some("Brest"));
    }

    #[test]
    fn test_unknown_charset_rejected() {
        let err = CsvStreamSource::new("a".as_bytes(), ",", "klingon-8", true).unwrap_err();
        assert!(matches!(err, SourceError::Config(ConfigError::UnknownCharset(_))));
    }

    #[test]
    fn test_unknown_charset_rejected_before_reading() {
        let err = CsvStreamSource::new(FailingReader, ",", "klingon-8", true).unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let err = CsvStreamSource::new("a".as_bytes(), "", "UTF-8", true).unwrap_err();
        assert!(matches!(err, SourceError::Config(ConfigError::EmptyDelimiter)));
    }

    #[test]
    fn test_unreadable_stream_fails_initialization() {
        let err = CsvStreamSource::new(FailingReader, ",", "UTF-8", true).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_auto_charset() {
        let mut src = CsvStreamSource::new("x\n1\n".as_bytes(), ",", "auto", true).unwrap();
        assert_eq!(src.charset(), "UTF-8");
        assert_eq!(src.query(None, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_line_reports_header_then_rows() {
        let mut src = source("", true);
        assert!(matches!(src.parse_line(""), ParsedLine::Skipped));
        assert!(matches!(src.parse_line("id,name"), ParsedLine::Header(_)));
        match src.parse_line("7,") {
            ParsedLine::Row(row) => {
                assert_eq!(row.get_column_by_name("id").unwrap().value().as_str(), Some("7"));
                assert!(row.get_column_by_name("name").unwrap().is_null());
            }
            other => panic!("expected a row, got {:?}", other),
        }
    }
}
