//! Disk access used by the transformer.
//!
//! `LocalStorage::write_new` is the durable write every transform depends
//! on:
//!
//! 1. Create a temp file (`.dirseal-XXXX`) next to the destination.
//! 2. Write, flush, copy the source's permissions, `fsync`.
//! 3. Rename into place **without** replacing an existing file.
//! 4. `fsync` the parent directory so the new name is durable too.
//!
//! If any step fails the temp file is dropped (and therefore deleted), so
//! a failed write never leaves a partial artifact behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::errors::{DirSealError, Result};

use super::naming::TEMP_PREFIX;

/// The filesystem operations a transform needs.
///
/// Tests swap in doubles to inject failures at precise steps.
pub trait Storage: Sync {
    /// Read a whole file into memory.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Durably create `path` with `contents`, taking permissions from
    /// `like` when possible.  Must fail with
    /// [`DirSealError::DestinationExists`] rather than replace a file, and
    /// must leave nothing at `path` when it fails.
    fn write_new(&self, path: &Path, contents: &[u8], like: &Path) -> Result<()>;

    /// Delete a file.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| DirSealError::file_io("read", path, e))
    }

    fn write_new(&self, path: &Path, contents: &[u8], like: &Path) -> Result<()> {
        if fs::symlink_metadata(path).is_ok() {
            return Err(DirSealError::DestinationExists(path.to_path_buf()));
        }

        let dir = parent_dir(path);
        let mut temp_file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| DirSealError::file_io("create temp file in", dir, e))?;

        temp_file
            .write_all(contents)
            .map_err(|e| DirSealError::file_io("write", temp_file.path(), e))?;
        temp_file
            .flush()
            .map_err(|e| DirSealError::file_io("flush", temp_file.path(), e))?;

        // Keep the source's mode; the temp file starts out owner-only.
        if let Ok(meta) = fs::metadata(like) {
            temp_file
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| DirSealError::file_io("set permissions on", temp_file.path(), e))?;
        }

        // fsync before the rename so the new name never points at a
        // half-written file.
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| DirSealError::file_io("sync", temp_file.path(), e))?;

        temp_file.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                DirSealError::DestinationExists(path.to_path_buf())
            } else {
                DirSealError::file_io("rename into", path, e.error)
            }
        })?;

        if let Err(e) = sync_dir(dir) {
            return Err(undo_unsynced(path, like, dir, e));
        }

        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Remove an output whose directory entry could not be synced, so the
/// caller keeps its source as the only copy.
fn undo_unsynced(path: &Path, like: &Path, dir: &Path, sync: io::Error) -> DirSealError {
    match fs::remove_file(path) {
        Ok(()) => DirSealError::file_io("sync directory", dir, sync),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            DirSealError::file_io("sync directory", dir, sync)
        }
        Err(e) => {
            tracing::warn!(
                output = %path.display(),
                source = %like.display(),
                error = %e,
                "could not roll back unsynced output"
            );
            DirSealError::RollbackFailed {
                output: path.to_path_buf(),
                source_file: like.to_path_buf(),
                sync,
                source: e,
            }
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
