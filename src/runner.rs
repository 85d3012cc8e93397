//! Running a whole encrypt or decrypt pass over a set of roots.
//!
//! Every root is walked independently and every file is handled on its
//! own: a bad root, an unreadable entry or a failed file is reported and
//! counted, and the pass moves on.  Only a bad key (checked before we get
//! here) stops a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{DirSealError, FailureKind, Result};
use crate::transform::{is_temp_file, FileTransformer, Mode, Storage, Transformed};
use crate::walk;

/// What to run and where.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    pub roots: Vec<PathBuf>,
    /// Worker threads per root; `1` keeps processing sequential.
    pub jobs: usize,
    /// List matching files without touching them.
    pub dry_run: bool,
    /// Canonical paths that are never transformed (the run's key file and
    /// config file).
    pub protected: Vec<PathBuf>,
}

/// Receives progress events.  Implementations must tolerate calls from
/// several worker threads when `jobs > 1`.
pub trait Reporter: Sync {
    fn root_entered(&self, mode: Mode, root: &Path);
    fn root_failed(&self, root: &Path, err: &DirSealError);
    fn file_transformed(&self, mode: Mode, done: &Transformed);
    fn file_would_transform(&self, mode: Mode, path: &Path);
    fn file_failed(&self, path: &Path, err: &DirSealError);
    fn finished(&self, summary: &RunSummary);
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub dry_run: bool,
    pub roots_visited: usize,
    pub roots_failed: usize,
    pub files_transformed: usize,
    pub files_pending: usize,
    pub io_failures: usize,
    pub auth_failures: usize,
    pub malformed: usize,
    pub cleanup_warnings: usize,
    pub other_failures: usize,
    pub skipped_entries: usize,
    pub protected_skipped: usize,
    pub leftover_temp_files: usize,
}

impl RunSummary {
    pub fn new(mode: Mode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            roots_visited: 0,
            roots_failed: 0,
            files_transformed: 0,
            files_pending: 0,
            io_failures: 0,
            auth_failures: 0,
            malformed: 0,
            cleanup_warnings: 0,
            other_failures: 0,
            skipped_entries: 0,
            protected_skipped: 0,
            leftover_temp_files: 0,
        }
    }

    /// Files that did not end in a clean transform.
    pub fn file_failures(&self) -> usize {
        self.io_failures
            + self.auth_failures
            + self.malformed
            + self.cleanup_warnings
            + self.other_failures
    }

    fn record(&mut self, outcome: &Result<Transformed>) {
        let err = match outcome {
            Ok(_) => {
                self.files_transformed += 1;
                return;
            }
            Err(e) => e,
        };
        match err.kind() {
            FailureKind::Io => self.io_failures += 1,
            FailureKind::Auth => self.auth_failures += 1,
            FailureKind::Malformed => self.malformed += 1,
            FailureKind::PartialCleanup => self.cleanup_warnings += 1,
            FailureKind::InvalidKey | FailureKind::Other => self.other_failures += 1,
        }
    }
}

/// Walk every root in `options` and transform what the mode accepts.
pub fn run<S: Storage>(
    transformer: &FileTransformer<S>,
    options: &RunOptions,
    reporter: &dyn Reporter,
) -> RunSummary {
    let mode = options.mode;
    let workers = Workers::new(options.jobs);
    let mut summary = RunSummary::new(mode, options.dry_run);

    for root in &options.roots {
        if let Err(e) = check_root(root) {
            tracing::warn!(root = %root.display(), error = %e, "skipping root");
            reporter.root_failed(root, &e);
            summary.roots_failed += 1;
            continue;
        }

        reporter.root_entered(mode, root);
        summary.roots_visited += 1;

        let canonical_root = fs::canonicalize(root).unwrap_or_else(|_| root.clone());
        let mut protected_skipped = 0;
        let mut leftover_temp_files = 0;
        let (files, stats) = walk::collect_files(root, |p| {
            if is_temp_file(p) {
                tracing::warn!(path = %p.display(), "leftover temp file from an interrupted run, not processed");
                leftover_temp_files += 1;
                return false;
            }
            if is_protected(&options.protected, root, &canonical_root, p) {
                tracing::warn!(path = %p.display(), "skipping the key or config file used by this run");
                protected_skipped += 1;
                return false;
            }
            mode.accepts(p)
        });
        summary.skipped_entries += stats.skipped;
        summary.protected_skipped += protected_skipped;
        summary.leftover_temp_files += leftover_temp_files;
        tracing::info!(
            root = %root.display(),
            visited = stats.visited,
            matched = stats.matched,
            skipped = stats.skipped,
            "walked root"
        );

        if options.dry_run {
            for path in &files {
                reporter.file_would_transform(mode, path);
            }
            summary.files_pending += files.len();
            continue;
        }

        let outcomes = workers.map(&files, |path| {
            let outcome = transformer.transform(mode, path);
            match &outcome {
                Ok(done) => reporter.file_transformed(mode, done),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "file not transformed");
                    reporter.file_failed(path, e);
                }
            }
            outcome
        });

        for outcome in &outcomes {
            summary.record(outcome);
        }
    }

    reporter.finished(&summary);
    summary
}

fn check_root(root: &Path) -> Result<()> {
    let meta = fs::metadata(root).map_err(|e| DirSealError::file_io("access", root, e))?;
    if !meta.is_dir() {
        return Err(DirSealError::file_io(
            "walk",
            root,
            io::Error::other("not a directory"),
        ));
    }
    Ok(())
}

/// Whether `path`, found by walking `root`, is one of `protected`.
///
/// The walk never follows symlinks, so the canonical form of a walked path
/// is the canonical root joined with its relative part.
fn is_protected(protected: &[PathBuf], root: &Path, canonical_root: &Path, path: &Path) -> bool {
    if protected.is_empty() {
        return false;
    }
    let canonical = match path.strip_prefix(root) {
        Ok(rel) => canonical_root.join(rel),
        Err(_) => path.to_path_buf(),
    };
    protected.iter().any(|p| *p == canonical)
}

/// Sequential or pooled per-file execution.
struct Workers {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Workers {
    #[cfg(feature = "parallel")]
    fn new(jobs: usize) -> Self {
        if jobs <= 1 {
            return Self { pool: None };
        }
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => {
                tracing::warn!(jobs, error = %e, "thread pool unavailable, running sequentially");
                Self { pool: None }
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn new(jobs: usize) -> Self {
        if jobs > 1 {
            tracing::warn!(jobs, "built without the `parallel` feature, running sequentially");
        }
        Self {}
    }

    /// Apply `f` to each path; every path is handed to exactly one worker.
    fn map<T, F>(&self, files: &[PathBuf], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> T + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                use rayon::prelude::*;
                return pool.install(|| files.par_iter().map(|p| f(p.as_path())).collect());
            }
        }

        files.iter().map(|p| f(p.as_path())).collect()
    }
}
