//! Walk — expand input paths into a deduplicated set of candidate files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Expand `inputs`: directories are walked recursively, anything else is
/// taken as-is. Paths are canonicalized when they exist, so the same file
/// reached two ways is counted once.
pub fn expand_paths<I, P>(inputs: I, follow_links: bool) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut found = BTreeSet::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let walker = WalkDir::new(input).follow_links(follow_links);
            for entry in walker.into_iter().filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(root = %input.display(), error = %e, "Skipping unreadable entry");
                    None
                }
            }) {
                if !entry.file_type().is_dir() {
                    found.insert(normalize(entry.path()));
                }
            }
        } else {
            found.insert(normalize(input));
        }
    }
    found
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
