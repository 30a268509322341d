/// Log format handling and schema discovery
///
/// This module turns physical Bro log files into a schema plus a stream of
/// raw rows, and coerces raw cells into typed values.
///
/// # Architecture
///
/// - `traits.rs`: Capability traits for format handlers and row sources
/// - `registry.rs`: File extension → format mapping
/// - `formats/`: One handler per on-disk encoding (ASCII text, DataSeries)
/// - `coerce.rs`: Declared-type tokens and shared numeric coercion
/// - `model.rs`: Schema, typed values, records and error types
///
/// # Error Policy
///
/// Discovery failures are reported as [`SchemaError`] and only ever mark a
/// file invalid. Streaming failures are reported per row as [`ParseError`]
/// and are never replaced by a default value.

pub mod traits;
pub mod registry;
pub mod coerce;
pub mod formats;
pub mod model;
mod serde_utils;

// Re-export commonly used types
pub use traits::{FormatHandler, HandlerContext, RowSource};
pub use registry::FormatRegistry;
pub use model::{FieldSpec, LogKind, ParseError, Schema, SchemaError, TypedRecord, Value};

// Constants
pub const COMMENT_MARKER: char = '#';
pub const EMPTY_FIELD_MARKER: &str = "-";
/// DataSeries stores time values as integer ticks of 10 microseconds.
pub const DS_TIME_SCALE: f64 = 100_000.0;
/// Number of header lines an ASCII log carries before its first row.
pub const ASCII_HEADER_LINES: usize = 4;
