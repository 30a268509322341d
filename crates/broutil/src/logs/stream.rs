//! Stream — lazy typed records over every file of one logical log.

use std::iter::FusedIterator;
use std::sync::Arc;

use super::descriptor::LogFileDescriptor;
use crate::parser::traits::*;
use crate::parser::TypedRecord;

/// The file currently being read.
struct OpenFile<'a> {
    descriptor: &'a LogFileDescriptor,
    schema: Arc<Schema>,
    rows: RowSource<'a>,
}

impl OpenFile<'_> {
    fn record(&self, cells: Vec<String>) -> Result<TypedRecord, ParseError> {
        if cells.len() != self.schema.len() {
            return Err(ParseError::FieldCount {
                expected: self.schema.len(),
                found: cells.len(),
            });
        }

        let handler = self.descriptor.handler();
        let values = self
            .schema
            .fields()
            .iter()
            .zip(&cells)
            .map(|(field, raw)| handler.coerce(field, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypedRecord::new(Arc::clone(&self.schema), values))
    }
}

/// Single-pass iterator over a log group's records.
///
/// Files are opened one at a time, on demand, in group order; each row is
/// typed with its own file's schema and format rules. A failed row or file
/// is yielded as an `Err` item and iteration carries on with what follows.
/// Once `None` is returned the generator stays exhausted. Dropping it early
/// closes whichever file is open.
pub struct RecordGenerator<'a> {
    descriptors: &'a [LogFileDescriptor],
    next_index: usize,
    current: Option<OpenFile<'a>>,
    finished: bool,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(descriptors: &'a [LogFileDescriptor]) -> Self {
        Self {
            descriptors,
            next_index: 0,
            current: None,
            finished: false,
        }
    }

    /// Whether a file is currently held open.
    pub fn has_open_file(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<'a> Iterator for RecordGenerator<'a> {
    type Item = Result<TypedRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Some(file) = self.current.as_mut() {
                if let Some(row) = file.rows.next() {
                    return Some(row.and_then(|cells| file.record(cells)));
                }
            }
            // Current file exhausted (or none open yet): release it first.
            self.current = None;

            let descriptors = self.descriptors;
            let Some(descriptor) = descriptors.get(self.next_index) else {
                self.finished = true;
                break;
            };
            self.next_index += 1;

            let Some(schema) = descriptor.schema() else {
                continue;
            };
            match descriptor.open() {
                Ok(rows) => {
                    self.current = Some(OpenFile {
                        descriptor,
                        schema: Arc::clone(schema),
                        rows,
                    });
                }
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl FusedIterator for RecordGenerator<'_> {}
