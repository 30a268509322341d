//! Scratch — owned working directory for decoded DataSeries output.
//!
//! The directory lives as long as the last [`ScratchSpace`] handle; each
//! artifact is a [`TempPath`] owned by the handler that decoded it, so both
//! are removed on drop, whether streaming finished or was abandoned.

use std::io;
use std::path::Path;

use tempfile::{Builder, TempDir, TempPath};
use tracing::debug;

#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh scratch directory, under `base` when given, otherwise
    /// under the system temp directory.
    pub fn new(base: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("broutil-");
        let dir = match base {
            Some(base) => builder.tempdir_in(base)?,
            None => builder.tempdir()?,
        };
        debug!(dir = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reserve a new, empty artifact file inside the scratch directory.
    pub fn artifact(&self) -> io::Result<TempPath> {
        let file = Builder::new()
            .prefix("ds-")
            .suffix(".txt")
            .tempfile_in(self.dir.path())?;
        Ok(file.into_temp_path())
    }
}
