//! Live — `ds2txt` subprocess implementation of [`Decoder`].

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::decoder::{DecodeError, DecodeMode, Decoder};

/// Runs the DataSeries `ds2txt` tool.
#[derive(Debug, Clone)]
pub struct Ds2TxtDecoder {
    program: String,
}

impl Ds2TxtDecoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the `ds2txt` command line for a request mode.
    fn command(&self, mode: DecodeMode, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(mode, path));
        cmd
    }

    fn args(mode: DecodeMode, path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = match mode {
            DecodeMode::Schema => vec![
                "--skip-index".into(),
                "--select".into(),
                "DataSeries: XmlType".into(),
                "*".into(),
            ],
            DecodeMode::Rows => vec![
                "--csv".into(),
                "--skip-extent-fieldnames".into(),
                // A real tab; ds2txt uses the argument verbatim.
                "--separator=\t".into(),
            ],
        };
        args.push(path.as_os_str().to_os_string());
        args
    }
}

impl Decoder for Ds2TxtDecoder {
    fn run(&self, mode: DecodeMode, path: &Path, out: &mut dyn Write) -> Result<u64, DecodeError> {
        let mut child = self
            .command(mode, path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DecodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let copied = match child.stdout.take() {
            Some(mut stdout) => io::copy(&mut stdout, out),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "decoder stdout unavailable")),
        };

        let written = match copied {
            Ok(n) => n,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DecodeError::Io(e));
            }
        };

        let status = child.wait()?;
        if !status.success() {
            debug!(path = %path.display(), ?mode, %status, bytes = written, "ds2txt exited unsuccessfully");
        }

        Ok(written)
    }
}
