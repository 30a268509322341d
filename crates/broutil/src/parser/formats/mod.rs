/// Individual log format handlers

pub mod ascii;
pub mod dataseries;

use std::io::{BufRead, Read};

use grep_matcher::{Captures, Matcher};
use grep_regex::RegexMatcher;

use crate::parser::traits::*;
use crate::parser::COMMENT_MARKER;

// Re-export handler implementations
pub use ascii::AsciiHandler;
pub use dataseries::DataSeriesHandler;

impl LogKind {
    /// Create a fresh handler for one physical file of this kind.
    pub fn handler(self, ctx: &HandlerContext) -> Box<dyn FormatHandler> {
        match self {
            LogKind::Ascii => Box::new(AsciiHandler::new()),
            LogKind::DataSeries => Box::new(DataSeriesHandler::new(ctx.clone())),
        }
    }
}

/// Compile a fixed header pattern. Callers keep the result in a static so
/// each pattern is built once per process.
pub(crate) fn compile(pattern: &str) -> Result<RegexMatcher, String> {
    RegexMatcher::new(pattern).map_err(|e| e.to_string())
}

/// First capture group of `matcher` against `line`, if it matches.
pub(crate) fn capture(matcher: &RegexMatcher, line: &str) -> Result<Option<String>, SchemaError> {
    Ok(capture_all(matcher, line)?.into_iter().next())
}

/// Every capture group (1..) of `matcher` against `line`, empty on no match.
pub(crate) fn capture_all(matcher: &RegexMatcher, line: &str) -> Result<Vec<String>, SchemaError> {
    let mut caps = matcher
        .new_captures()
        .map_err(|e| SchemaError::Pattern(e.to_string()))?;
    let found = matcher
        .captures(line.as_bytes(), &mut caps)
        .map_err(|e| SchemaError::Pattern(e.to_string()))?;
    if !found {
        return Ok(Vec::new());
    }

    let bytes = line.as_bytes();
    Ok((1..caps.len())
        .filter_map(|i| caps.get(i))
        .map(|m| String::from_utf8_lossy(&bytes[m.start()..m.end()]).into_owned())
        .collect())
}

/// Line-oriented delimited rows of a text log. Comment rows are skipped.
///
/// An I/O failure ends the source after being reported once; a line that is
/// not valid UTF-8 is reported and skipped.
pub(crate) struct DelimitedRows<R> {
    reader: R,
    separator: String,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> DelimitedRows<R> {
    pub(crate) fn new(reader: R, separator: impl Into<String>) -> Self {
        Self {
            reader,
            separator: separator.into(),
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for DelimitedRows<R> {
    type Item = Result<Vec<String>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    let line = match std::str::from_utf8(&self.buf) {
                        Ok(line) => line.trim_end_matches(&['\n', '\r'][..]),
                        Err(e) => {
                            let err = std::io::Error::new(std::io::ErrorKind::InvalidData, e);
                            return Some(Err(ParseError::Io(err)));
                        }
                    };
                    if line.is_empty() {
                        continue;
                    }

                    let cells: Vec<String> = line.split(self.separator.as_str()).map(str::to_string).collect();
                    let is_comment = cells
                        .first()
                        .map(|c| c.trim_start().starts_with(COMMENT_MARKER))
                        .unwrap_or(false);
                    if is_comment {
                        continue;
                    }
                    return Some(Ok(cells));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(ParseError::Io(e)));
                }
            }
        }
        None
    }
}

/// Delimited rows with CSV quoting, as the DataSeries decoder writes them.
///
/// Quoted cells may contain the delimiter; a malformed record is reported
/// and skipped, an I/O failure ends the source.
pub(crate) struct CsvRows<R> {
    records: csv::StringRecordsIntoIter<R>,
    done: bool,
}

impl<R: Read> CsvRows<R> {
    pub(crate) fn new(reader: R, delimiter: u8) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self { records, done: false }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Vec<String>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.records.next() {
            Some(Ok(record)) => Some(Ok(record.iter().map(str::to_string).collect())),
            Some(Err(e)) => {
                if e.is_io_error() {
                    self.done = true;
                }
                Some(Err(ParseError::Csv(e)))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows(input: &str) -> Vec<Vec<String>> {
        DelimitedRows::new(Cursor::new(input.as_bytes().to_vec()), "\t")
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_delimited_rows_skip_comments_and_blank_lines() {
        let input = "#separator \\x09\n1.0\tabc\n\n  #close\t2024\n2.0\tdef\r\n";
        let out = rows(input);
        assert_eq!(out, vec![vec!["1.0", "abc"], vec!["2.0", "def"]]);
    }

    #[test]
    fn test_csv_rows_unquote_cells() {
        let input = "1\t\"a\tb\"\t3\n2\t\"say \"\"hi\"\"\"\t-\r\n";
        let out: Vec<Vec<String>> = CsvRows::new(Cursor::new(input), b'\t').map(|r| r.unwrap()).collect();
        assert_eq!(
            out,
            vec![vec!["1", "a\tb", "3"], vec!["2", "say \"hi\"", "-"]]
        );
    }

    #[test]
    fn test_csv_rows_keep_hash_cells_and_ragged_rows() {
        let out: Vec<Vec<String>> = CsvRows::new(Cursor::new("#tag\tx\n1\n"), b'\t')
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(out, vec![vec!["#tag", "x"], vec!["1"]]);
    }

    #[test]
    fn test_csv_rows_report_non_utf8_and_continue() {
        let mut input = b"a\tb\n".to_vec();
        input.extend_from_slice(b"\xff\tz\n");
        input.extend_from_slice(b"c\td\n");
        let mut it = CsvRows::new(Cursor::new(input), b'\t');

        assert_eq!(it.next().unwrap().unwrap(), vec!["a", "b"]);
        assert!(matches!(it.next(), Some(Err(ParseError::Csv(_)))));
        assert_eq!(it.next().unwrap().unwrap(), vec!["c", "d"]);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_delimited_rows_report_non_utf8_and_continue() {
        let mut input = b"a\tb\n".to_vec();
        input.extend_from_slice(b"\xff\xfe\n");
        input.extend_from_slice(b"c\td\n");
        let mut it = DelimitedRows::new(Cursor::new(input), "\t");

        assert_eq!(it.next().unwrap().unwrap(), vec!["a", "b"]);
        assert!(matches!(it.next(), Some(Err(ParseError::Io(_)))));
        assert_eq!(it.next().unwrap().unwrap(), vec!["c", "d"]);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_capture_groups() {
        let matcher = compile(r"^<!--(.*?)=(.*?)-->").unwrap();
        assert_eq!(
            capture_all(&matcher, "<!--ts=time-->").unwrap(),
            vec!["ts".to_string(), "time".to_string()]
        );
        assert!(capture_all(&matcher, "<field name=\"ts\"/>").unwrap().is_empty());
        assert_eq!(capture(&matcher, "<!--uid=string-->").unwrap(), Some("uid".to_string()));
    }
}
