//! Aggregate — load a set of files/directories and expose one record
//! stream per logical log path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::descriptor::LogFileDescriptor;
use super::group::{check_consistency, group_by_log_path, LogGroup};
use super::stream::RecordGenerator;
use super::walk::expand_paths;
use crate::client::{Decoder, Ds2TxtDecoder};
use crate::conf::BroUtilConfig;
use crate::parser::{FormatRegistry, HandlerContext};
use crate::scratch::ScratchSpace;

/// Counters from the most recent load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Unique supported files considered
    pub total: usize,
    /// Files whose schema was discovered
    pub loaded: usize,
    /// Distinct logical log paths
    pub log_paths: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} logfiles.", self.total)?;
        writeln!(f, "Successfully loaded {} logfiles.", self.loaded)?;
        write!(f, "Identified {} unique bro paths.", self.log_paths)
    }
}

/// Groups physical Bro logs by logical log path.
///
/// Each [`load`](Self::load) replaces everything learned by the previous one.
#[derive(Debug)]
pub struct LogAggregator {
    registry: FormatRegistry,
    ctx: HandlerContext,
    follow_symlinks: bool,
    considered: BTreeSet<PathBuf>,
    groups: BTreeMap<String, LogGroup>,
    mismatched: Vec<String>,
    stats: LoadStats,
}

impl LogAggregator {
    pub fn new(registry: FormatRegistry, ctx: HandlerContext) -> Self {
        Self {
            registry,
            ctx,
            follow_symlinks: false,
            considered: BTreeSet::new(),
            groups: BTreeMap::new(),
            mismatched: Vec::new(),
            stats: LoadStats::default(),
        }
    }

    /// Default registry, `ds2txt` decoder and a fresh scratch directory.
    pub fn from_config(config: &BroUtilConfig) -> io::Result<Self> {
        let decoder: Arc<dyn Decoder> = Arc::new(Ds2TxtDecoder::new(config.decoder_program.clone()));
        Self::with_decoder(config, decoder)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied decoder.
    pub fn with_decoder(config: &BroUtilConfig, decoder: Arc<dyn Decoder>) -> io::Result<Self> {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let scratch = ScratchSpace::new(config.scratch_dir.as_deref().map(Path::new))?;
        let ctx = HandlerContext {
            decoder,
            scratch: Arc::new(scratch),
            time_scale: config.time_scale,
        };
        Ok(Self::new(FormatRegistry::with_defaults(), ctx).with_follow_symlinks(config.follow_symlinks))
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Directory holding decoded DataSeries artifacts.
    pub fn scratch_dir(&self) -> &Path {
        self.ctx.scratch.path()
    }

    pub fn supports(&self, path: impl AsRef<Path>) -> bool {
        self.registry.supports(path)
    }

    /// Discover, validate and group every supported file under `paths`.
    pub fn load<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        // Release the previous load's files and artifacts before building anew.
        self.groups.clear();
        self.mismatched.clear();

        self.considered = expand_paths(paths, self.follow_symlinks)
            .into_iter()
            .filter(|path| self.registry.supports(path))
            .collect();

        let descriptors: Vec<LogFileDescriptor> = self
            .considered
            .iter()
            .filter_map(|path| {
                self.registry
                    .lookup(path)
                    .map(|kind| LogFileDescriptor::discover(path.clone(), kind, &self.ctx))
            })
            .filter(LogFileDescriptor::is_valid)
            .collect();
        let loaded = descriptors.len();

        self.groups = group_by_log_path(descriptors);
        self.mismatched = check_consistency(&self.groups);
        self.stats = LoadStats {
            total: self.considered.len(),
            loaded,
            log_paths: self.groups.len(),
        };

        info!(
            total = self.stats.total,
            loaded = self.stats.loaded,
            log_paths = self.stats.log_paths,
            "Loaded bro logs"
        );
    }

    /// Lazy typed records for `log_path`, or `None` if no file declared it.
    ///
    /// Every call starts an independent pass over the group's files.
    pub fn get(&self, log_path: &str) -> Option<RecordGenerator<'_>> {
        self.groups
            .get(log_path)
            .map(|group| RecordGenerator::new(group.descriptors()))
    }

    pub fn group(&self, log_path: &str) -> Option<&LogGroup> {
        self.groups.get(log_path)
    }

    /// Files backing `log_path`, ordered by physical path.
    pub fn descriptors(&self, log_path: &str) -> Option<&[LogFileDescriptor]> {
        self.groups.get(log_path).map(LogGroup::descriptors)
    }

    /// Discovered logical log paths, sorted.
    pub fn log_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.keys().map(String::as_str)
    }

    /// Log paths whose files disagree on schema.
    pub fn mismatched_paths(&self) -> &[String] {
        &self.mismatched
    }

    /// Supported physical paths the last load considered.
    pub fn considered(&self) -> impl Iterator<Item = &Path> + '_ {
        self.considered.iter().map(PathBuf::as_path)
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn total_count(&self) -> usize {
        self.stats.total
    }

    pub fn success_count(&self) -> usize {
        self.stats.loaded
    }

    pub fn log_path_count(&self) -> usize {
        self.stats.log_paths
    }
}
