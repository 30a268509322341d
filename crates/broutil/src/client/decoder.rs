//! Decoder trait — abstract interface over the DataSeries text decoder.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to launch decoder '{program}': {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
    #[error("Decoder I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// What the decoder is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeMode {
    /// The embedded XML schema definitions, as text
    Schema,
    /// Every data row, tab separated, no field-name header
    Rows,
}

/// Turns a DataSeries container into text.
///
/// Implementations must be `Send + Sync` so one decoder can be shared by
/// every handler of an aggregator.
pub trait Decoder: Send + Sync + fmt::Debug {
    /// Decode `path` in the given mode, copying the text output into `out`.
    ///
    /// Returns the number of bytes written. Zero means the decoder produced
    /// no output (unreadable or unsupported file); the caller decides what
    /// that implies.
    fn run(&self, mode: DecodeMode, path: &Path, out: &mut dyn Write) -> Result<u64, DecodeError>;
}
