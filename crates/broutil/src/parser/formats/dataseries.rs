use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use grep_regex::RegexMatcher;
use tempfile::TempPath;
use tracing::debug;

use super::{capture, capture_all, compile, CsvRows};
use crate::client::DecodeMode;
use crate::parser::coerce::coerce_scaled;
use crate::parser::traits::*;

// Our schema is the only XML in the container expected to carry comments
// of this shape; other commented extents would leak into the field list.
const FIELD_PATTERN: &str = r"^\s*<!--(.*?)=(.*?)-->";
const PATH_PATTERN: &str =
    r#"^\s*<ExtentType name="(.*?)" version="1\.0" namespace="bro-ids\.org">"#;
const ROW_SEPARATOR: u8 = b'\t';

struct SchemaPatterns {
    field: RegexMatcher,
    path: RegexMatcher,
}

static SCHEMA_PATTERNS: LazyLock<Result<SchemaPatterns, String>> = LazyLock::new(|| {
    Ok(SchemaPatterns {
        field: compile(FIELD_PATTERN)?,
        path: compile(PATH_PATTERN)?,
    })
});

/// Decoded rows of one container, memoized so repeated opens reuse them.
#[derive(Debug)]
struct Extracted {
    source: PathBuf,
    artifact: TempPath,
}

/// Bro DataSeries containers, read through the external decoder.
#[derive(Debug)]
pub struct DataSeriesHandler {
    ctx: HandlerContext,
    extracted: RefCell<Option<Extracted>>,
}

impl DataSeriesHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
            extracted: RefCell::new(None),
        }
    }

    /// Path of the decoded artifact, decoding `path` first if needed.
    fn artifact_for(&self, path: &Path) -> Result<PathBuf, ParseError> {
        let mut slot = self.extracted.borrow_mut();
        if let Some(extracted) = slot.as_ref() {
            if extracted.source == path {
                return Ok(extracted.artifact.to_path_buf());
            }
        }

        debug!(path = %path.display(), "Extracting");
        let artifact = self.ctx.scratch.artifact()?;
        let mut out = File::create(&artifact)?;
        let written = self.ctx.decoder.run(DecodeMode::Rows, path, &mut out)?;
        debug!(path = %path.display(), bytes = written, artifact = %artifact.display(), "Extracted rows");

        let artifact_path = artifact.to_path_buf();
        *slot = Some(Extracted {
            source: path.to_path_buf(),
            artifact,
        });
        Ok(artifact_path)
    }
}

impl FormatHandler for DataSeriesHandler {
    fn kind(&self) -> LogKind {
        LogKind::DataSeries
    }

    fn discover_schema(&mut self, path: &Path) -> Result<Schema, SchemaError> {
        let mut out = Vec::new();
        let written = self.ctx.decoder.run(DecodeMode::Schema, path, &mut out)?;
        if written == 0 || out.is_empty() {
            return Err(SchemaError::EmptyDecoderOutput);
        }
        parse_schema_xml(&String::from_utf8_lossy(&out))
    }

    fn open(&self, path: &Path) -> Result<RowSource<'_>, ParseError> {
        let artifact = self.artifact_for(path)?;
        let reader = File::open(artifact)?;
        Ok(Box::new(CsvRows::new(reader, ROW_SEPARATOR)))
    }

    fn coerce(&self, field: &FieldSpec, raw: &str) -> Result<Value, ParseError> {
        coerce_scaled(field, raw, self.ctx.time_scale)
    }
}

/// Scan decoder XML for the Bro extent name and `<!--name=type-->` field
/// annotations. The last extent name seen wins; fields keep document order.
pub fn parse_schema_xml(xml: &str) -> Result<Schema, SchemaError> {
    let patterns = SCHEMA_PATTERNS
        .as_ref()
        .map_err(|e| SchemaError::Pattern(e.clone()))?;

    let mut log_path = String::new();
    let mut fields = Vec::new();
    for line in xml.lines() {
        if let [name, type_name] = capture_all(&patterns.field, line)?.as_slice() {
            fields.push(FieldSpec::new(name.as_str(), type_name.as_str()));
        }
        if let Some(name) = capture(&patterns.path, line)? {
            log_path = name;
        }
    }

    if log_path.is_empty() {
        return Err(SchemaError::MissingLogPath);
    }
    Schema::new(log_path, fields)
}
