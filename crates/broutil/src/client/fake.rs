//! Fake — test double for the DataSeries decoder.
//!
//! Provides a deterministic [`FakeDecoder`] that implements [`Decoder`]
//! from in-memory canned output, keyed by file path. Unknown paths produce
//! no output, like the real tool on an unreadable file.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::decoder::{DecodeError, DecodeMode, Decoder};

/// Canned decoder output for one container file.
#[derive(Clone, Debug, Default)]
pub struct FakeContainer {
    pub schema_xml: String,
    pub rows: String,
}

/// Mutable inner state protected by a mutex.
#[derive(Debug, Default)]
struct Inner {
    containers: HashMap<PathBuf, FakeContainer>,
    calls: Vec<(DecodeMode, PathBuf)>,
}

/// A fake decoder for deterministic testing.
#[derive(Debug, Default)]
pub struct FakeDecoder {
    inner: Mutex<Inner>,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `schema_xml` and `rows` for `path`.
    pub fn with_container(
        self,
        path: impl Into<PathBuf>,
        schema_xml: impl Into<String>,
        rows: impl Into<String>,
    ) -> Self {
        self.add_container(path, schema_xml, rows);
        self
    }

    pub fn add_container(
        &self,
        path: impl Into<PathBuf>,
        schema_xml: impl Into<String>,
        rows: impl Into<String>,
    ) {
        let container = FakeContainer {
            schema_xml: schema_xml.into(),
            rows: rows.into(),
        };
        self.lock().containers.insert(path.into(), container);
    }

    /// Number of times `mode` was requested, across all paths.
    pub fn calls(&self, mode: DecodeMode) -> usize {
        self.lock().calls.iter().filter(|(m, _)| *m == mode).count()
    }

    /// Number of times `mode` was requested for `path`.
    pub fn calls_for(&self, mode: DecodeMode, path: &Path) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(m, p)| *m == mode && p == path)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned fake only means another test thread panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Decoder for FakeDecoder {
    fn run(&self, mode: DecodeMode, path: &Path, out: &mut dyn Write) -> Result<u64, DecodeError> {
        let mut inner = self.lock();
        inner.calls.push((mode, path.to_path_buf()));

        let text = match inner.containers.get(path) {
            Some(container) => match mode {
                DecodeMode::Schema => container.schema_xml.as_bytes(),
                DecodeMode::Rows => container.rows.as_bytes(),
            },
            None => return Ok(0),
        };
        out.write_all(text)?;
        Ok(text.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_serves_canned_output() {
        let fake = FakeDecoder::new().with_container("conn.ds", "<xml/>", "1\t2\n");

        let mut schema = Vec::new();
        let n = fake.run(DecodeMode::Schema, Path::new("conn.ds"), &mut schema).unwrap();
        assert_eq!(n, 6);
        assert_eq!(schema, b"<xml/>");

        let mut rows = Vec::new();
        fake.run(DecodeMode::Rows, Path::new("conn.ds"), &mut rows).unwrap();
        assert_eq!(rows, b"1\t2\n");

        assert_eq!(fake.calls(DecodeMode::Schema), 1);
        assert_eq!(fake.calls_for(DecodeMode::Rows, Path::new("conn.ds")), 1);
    }

    #[test]
    fn test_fake_unknown_path_produces_nothing() {
        let fake = FakeDecoder::new();
        let mut out = Vec::new();
        let n = fake.run(DecodeMode::Schema, Path::new("missing.ds"), &mut out).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
        assert_eq!(fake.calls(DecodeMode::Schema), 1);
    }
}
