//! Recursive file enumeration under a root directory.
//!
//! Only regular files are visited; symlinks are neither followed nor
//! visited.  An entry that cannot be read (permission denied, vanished
//! mid-walk, ...) is logged and counted, and the walk carries on.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files seen.
    pub visited: usize,
    /// Files the predicate accepted.
    pub matched: usize,
    /// Entries skipped because of an error.
    pub skipped: usize,
}

/// Call `visit` for every regular file under `root` that `predicate` accepts.
pub fn for_each_file<P, V>(root: &Path, mut predicate: P, mut visit: V) -> WalkStats
where
    P: FnMut(&Path) -> bool,
    V: FnMut(&Path),
{
    let mut stats = WalkStats::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                stats.skipped += 1;
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                tracing::warn!(path = %path, error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        stats.visited += 1;

        let path = entry.path();
        if predicate(path) {
            stats.matched += 1;
            visit(path);
        }
    }

    stats
}

/// Gather the matching files under `root`, in walk order.
pub fn collect_files<P>(root: &Path, predicate: P) -> (Vec<PathBuf>, WalkStats)
where
    P: FnMut(&Path) -> bool,
{
    let mut files = Vec::new();
    let stats = for_each_file(root, predicate, |p| files.push(p.to_path_buf()));
    (files, stats)
}
