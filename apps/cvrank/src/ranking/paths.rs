//! Resume path expansion.
//!
//! Each input may hold several comma-separated entries. Entries containing glob
//! metacharacters expand to the matching files in sorted order; other entries
//! are kept as literal paths even when they do not exist, so a missing file
//! shows up as a failed item instead of silently shrinking the batch.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

/// Identity used for de-duplication: the canonical path when the file exists,
/// otherwise the path without `.` components.
fn dedupe_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

/// Expands patterns into an ordered, de-duplicated list of paths.
pub fn expand_resume_paths<S: AsRef<str>>(patterns: &[S]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    let entries = patterns
        .iter()
        .flat_map(|p| p.as_ref().split(','))
        .map(str::trim)
        .filter(|e| !e.is_empty());

    for entry in entries {
        if !is_glob(entry) {
            let path = PathBuf::from(entry);
            if seen.insert(dedupe_key(&path)) {
                paths.push(path);
            }
            continue;
        }

        let matches = match glob::glob(entry) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Invalid glob pattern '{entry}': {e}");
                continue;
            }
        };
        let mut matched = 0usize;
        for path in matches.filter_map(Result::ok).filter(|p| p.is_file()) {
            matched += 1;
            if seen.insert(dedupe_key(&path)) {
                paths.push(path);
            }
        }
        debug!("Pattern '{entry}' matched {matched} file(s)");
    }

    paths
}
