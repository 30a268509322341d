//! Descriptor — one physical log file, its handler and discovered schema.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::parser::traits::*;

/// A physical file paired with the handler that understands it.
///
/// Discovery runs once at construction; the descriptor is immutable
/// afterwards. A descriptor without a schema is invalid and never joins a
/// log group.
#[derive(Debug)]
pub struct LogFileDescriptor {
    path: PathBuf,
    handler: Box<dyn FormatHandler>,
    schema: Option<Arc<Schema>>,
}

impl LogFileDescriptor {
    /// Create the handler for `kind` and run schema discovery on `path`.
    pub fn discover(path: impl Into<PathBuf>, kind: LogKind, ctx: &HandlerContext) -> Self {
        Self::with_handler(path, kind.handler(ctx))
    }

    /// Run schema discovery on `path` with an already constructed handler.
    pub fn with_handler(path: impl Into<PathBuf>, mut handler: Box<dyn FormatHandler>) -> Self {
        let path = path.into();
        let schema = match handler.discover_schema(&path) {
            Ok(schema) => Some(Arc::new(schema)),
            Err(e) => {
                debug!(
                    path = %path.display(),
                    format = handler.kind().as_str(),
                    error = %e,
                    "Skipping log file"
                );
                None
            }
        };

        Self { path, handler, schema }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> LogKind {
        self.handler.kind()
    }

    pub fn handler(&self) -> &dyn FormatHandler {
        self.handler.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.schema.is_some()
    }

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema.as_deref().map(Schema::id)
    }

    /// Logical log path the file declares (`conn`, `dns`, ...).
    pub fn log_path(&self) -> Option<&str> {
        self.schema.as_deref().map(Schema::log_path)
    }

    /// Open the file for streaming raw rows. Fails for invalid descriptors.
    pub fn open(&self) -> Result<RowSource<'_>, ParseError> {
        if !self.is_valid() {
            return Err(ParseError::InvalidFile(self.path.display().to_string()));
        }
        self.handler.open(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeDecoder;
    use crate::scratch::ScratchSpace;
    use crate::parser::DS_TIME_SCALE;

    fn context() -> HandlerContext {
        HandlerContext {
            decoder: Arc::new(FakeDecoder::new()),
            scratch: Arc::new(ScratchSpace::new(None).unwrap()),
            time_scale: DS_TIME_SCALE,
        }
    }

    #[test]
    fn test_valid_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dns.log");
        std::fs::write(&path, "#x\n#path:'dns'\n#separator:'\\t'\n#fields\tts=time\tquery=string\n").unwrap();

        let desc = LogFileDescriptor::discover(&path, LogKind::Ascii, &context());
        assert!(desc.is_valid());
        assert_eq!(desc.kind(), LogKind::Ascii);
        assert_eq!(desc.log_path(), Some("dns"));
        assert_eq!(desc.path(), path.as_path());
        assert_eq!(desc.schema_id(), desc.schema().map(|s| s.id()));
        assert_eq!(desc.open().unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dns.log");
        std::fs::write(&path, "not a bro log\n").unwrap();

        let desc = LogFileDescriptor::discover(&path, LogKind::Ascii, &context());
        assert!(!desc.is_valid());
        assert_eq!(desc.log_path(), None);
        assert_eq!(desc.schema_id(), None);
        assert!(matches!(desc.open(), Err(ParseError::InvalidFile(_))));
    }

    #[test]
    fn test_decoder_failure_is_invalid() {
        let desc = LogFileDescriptor::discover("missing.ds", LogKind::DataSeries, &context());
        assert!(!desc.is_valid());
        assert_eq!(desc.kind(), LogKind::DataSeries);
    }
}
