use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use grep_regex::RegexMatcher;

use super::{capture, compile, DelimitedRows};
use crate::parser::coerce::coerce_scaled;
use crate::parser::registry::extension_of;
use crate::parser::traits::*;
use crate::parser::{ASCII_HEADER_LINES, EMPTY_FIELD_MARKER};

const PATH_PATTERN: &str = r"^\s*#\s*path:'(.*)'";
const SEPARATOR_PATTERN: &str = r"^\s*#\s*separator:'(.*)'";
const FIELDS_PATTERN: &str = r"^\s*#\s*(.*)$";

/// Container a text log is stored in, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Bzip2,
}

impl Compression {
    pub fn for_path(path: &Path) -> Self {
        match extension_of(path) {
            Some(ext) if ext.ends_with("gz") => Compression::Gzip,
            Some(ext) if ext.ends_with("bz2") => Compression::Bzip2,
            _ => Compression::Plain,
        }
    }
}

/// Open a text log, decompressing transparently.
pub fn raw_open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    Ok(match Compression::for_path(path) {
        Compression::Plain => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Bzip2 => Box::new(BufReader::new(MultiBzDecoder::new(file))),
    })
}

struct HeaderPatterns {
    path: RegexMatcher,
    separator: RegexMatcher,
    fields: RegexMatcher,
}

impl HeaderPatterns {
    fn compile() -> Result<Self, String> {
        Ok(Self {
            path: compile(PATH_PATTERN)?,
            separator: compile(SEPARATOR_PATTERN)?,
            fields: compile(FIELDS_PATTERN)?,
        })
    }

    fn get() -> Result<&'static Self, SchemaError> {
        HEADER_PATTERNS
            .as_ref()
            .map_err(|e| SchemaError::Pattern(e.clone()))
    }
}

static HEADER_PATTERNS: LazyLock<Result<HeaderPatterns, String>> = LazyLock::new(HeaderPatterns::compile);

/// Bro ASCII logs: four header lines, then separator-delimited rows.
///
/// ```text
/// #separator \x09
/// #path:'conn'
/// #separator:'\t'
/// #fields	ts=time	uid=string
/// ```
#[derive(Debug, Default)]
pub struct AsciiHandler {
    separator: Option<String>,
}

impl AsciiHandler {
    pub fn new() -> Self {
        Self { separator: None }
    }

    /// Separator declared by the header; set once discovery succeeds.
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    fn read_header(path: &Path) -> Result<Vec<String>, SchemaError> {
        let mut reader = raw_open(path)?;
        let mut lines = Vec::with_capacity(ASCII_HEADER_LINES);
        let mut buf = Vec::new();
        while lines.len() < ASCII_HEADER_LINES {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            lines.push(line.trim_end_matches(&['\n', '\r'][..]).to_string());
        }
        Ok(lines)
    }
}

impl FormatHandler for AsciiHandler {
    fn kind(&self) -> LogKind {
        LogKind::Ascii
    }

    fn discover_schema(&mut self, path: &Path) -> Result<Schema, SchemaError> {
        let patterns = HeaderPatterns::get()?;
        let header = Self::read_header(path)?;
        let line = |i: usize| header.get(i).map(String::as_str).unwrap_or("");

        // Line 1 carries nothing we need.
        let log_path = capture(&patterns.path, line(1))?.ok_or(SchemaError::MissingLogPath)?;

        let separator = capture(&patterns.separator, line(2))?
            .and_then(|raw| unescape_separator(&raw))
            .ok_or(SchemaError::MissingSeparator)?;

        let declaration = capture(&patterns.fields, line(3))?
            .ok_or_else(|| SchemaError::MalformedFields(line(3).to_string()))?;
        let fields = parse_field_list(&declaration, &separator)?;

        let schema = Schema::new(log_path, fields)?;
        self.separator = Some(separator);
        Ok(schema)
    }

    fn open(&self, path: &Path) -> Result<RowSource<'_>, ParseError> {
        let separator = self
            .separator
            .clone()
            .ok_or_else(|| ParseError::InvalidFile(path.display().to_string()))?;
        let reader = raw_open(path)?;
        Ok(Box::new(DelimitedRows::new(reader, separator)))
    }

    fn coerce(&self, field: &FieldSpec, raw: &str) -> Result<Value, ParseError> {
        if raw == EMPTY_FIELD_MARKER {
            return Ok(Value::Absent);
        }
        coerce_scaled(field, raw, 1.0)
    }
}

/// Decode a separator declaration: a literal string or the escapes `\t`,
/// `\\` and `\xHH`. Returns `None` for an empty or undecodable declaration.
pub fn unescape_separator(raw: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16).ok()?;
                // Rows are split as text, so only single-byte separators can match.
                if !byte.is_ascii() {
                    return None;
                }
                out.push(char::from(byte));
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Split a `name=type` declaration list. A leading bare label such as
/// `fields` is skipped; any other token without `=` is malformed.
pub fn parse_field_list(declaration: &str, separator: &str) -> Result<Vec<FieldSpec>, SchemaError> {
    let mut fields = Vec::new();
    for (i, token) in declaration.split(separator).enumerate() {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some((name, type_name)) if !name.is_empty() && !type_name.is_empty() => {
                fields.push(FieldSpec::new(name, type_name));
            }
            None if i == 0 => continue,
            _ => return Err(SchemaError::MalformedFields(token.to_string())),
        }
    }
    Ok(fields)
}
