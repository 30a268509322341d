use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::client::Decoder;
use crate::scratch::ScratchSpace;

pub use super::model::{FieldSpec, LogKind, ParseError, Schema, SchemaError, Value};

/// Raw rows of one opened file, cells in schema order.
///
/// Dropping the source releases the underlying file handle.
pub type RowSource<'a> = Box<dyn Iterator<Item = Result<Vec<String>, ParseError>> + 'a>;

/// One on-disk log encoding.
///
/// A handler instance belongs to exactly one physical file: discovery may
/// keep per-file state (separator, decoded artifact) that `open` reuses.
pub trait FormatHandler: fmt::Debug {
    fn kind(&self) -> LogKind;

    /// Read the file's header/metadata and return its schema.
    fn discover_schema(&mut self, path: &Path) -> Result<Schema, SchemaError>;

    /// Open the file for streaming raw rows.
    fn open(&self, path: &Path) -> Result<RowSource<'_>, ParseError>;

    /// Convert one raw cell into a typed value using this format's rules.
    fn coerce(&self, field: &FieldSpec, raw: &str) -> Result<Value, ParseError>;
}

/// Shared collaborators handed to every handler an aggregator creates.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub decoder: Arc<dyn Decoder>,
    pub scratch: Arc<ScratchSpace>,
    /// Divisor applied to DataSeries `time`/`interval` values
    pub time_scale: f64,
}
