//! Sealing and opening individual files.
//!
//! `FileTransformer` owns the per-file lifecycle:
//!
//! ```text
//! encrypt:  read P  -> seal -> write P.enc (durable) -> delete P
//! decrypt:  read P.enc -> open -> write P (durable) -> delete P.enc
//! ```
//!
//! The source is removed only after the output is durably on disk, and a
//! failed open never touches the artifact.  If the final delete fails the
//! transform still happened, so that case gets its own error
//! ([`DirSealError::PartialCleanupFailure`]) and both files are left for
//! the operator.

pub mod naming;
pub mod storage;

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::{Cipher, FileKey};
use crate::errors::{DirSealError, Result};

pub use naming::{is_temp_file, sealed_path, unsealed_path, Artifact, RESERVED_SUFFIX};
pub use storage::{LocalStorage, Storage};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    /// The artifact kind this mode consumes.
    pub fn input(self) -> Artifact {
        match self {
            Mode::Encrypt => Artifact::Plaintext,
            Mode::Decrypt => Artifact::Ciphertext,
        }
    }

    /// Walk predicate: should a run in this mode pick up `path`?
    pub fn accepts(self, path: &Path) -> bool {
        !is_temp_file(path) && Artifact::classify(path) == self.input()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Encrypt => f.write_str("encrypt"),
            Mode::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// A completed transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub source: PathBuf,
    pub output: PathBuf,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// Applies one key to files, one at a time.
pub struct FileTransformer<S: Storage = LocalStorage> {
    cipher: Cipher,
    storage: S,
}

impl FileTransformer<LocalStorage> {
    pub fn new(key: &FileKey) -> Self {
        Self::with_storage(key, LocalStorage)
    }
}

impl<S: Storage> FileTransformer<S> {
    pub fn with_storage(key: &FileKey, storage: S) -> Self {
        Self {
            cipher: Cipher::new(key),
            storage,
        }
    }

    /// Run `mode` against `path`.
    ///
    /// This is the only place the artifact kind is checked; the per-mode
    /// paths below assume a path of the right kind.
    pub fn transform(&self, mode: Mode, path: &Path) -> Result<Transformed> {
        if Artifact::classify(path) != mode.input() {
            return Err(DirSealError::WrongArtifactKind {
                path: path.to_path_buf(),
                mode,
            });
        }
        match mode {
            Mode::Encrypt => self.encrypt_file(path),
            Mode::Decrypt => self.decrypt_file(path),
        }
    }

    /// Seal `path` into `path.enc` and remove the plaintext.
    fn encrypt_file(&self, path: &Path) -> Result<Transformed> {
        let output = sealed_path(path);

        let plaintext = Zeroizing::new(self.storage.read(path)?);
        let artifact = self.cipher.seal_artifact(&plaintext)?;

        self.storage.write_new(&output, &artifact, path)?;
        tracing::debug!(source = %path.display(), output = %output.display(), "sealed");

        self.finish(path, output, plaintext.len(), artifact.len())
    }

    /// Open `path.enc` into `path` and remove the artifact.
    ///
    /// On any integrity failure the artifact is left exactly as it was.
    fn decrypt_file(&self, path: &Path) -> Result<Transformed> {
        let output = unsealed_path(path).ok_or_else(|| DirSealError::WrongArtifactKind {
            path: path.to_path_buf(),
            mode: Mode::Decrypt,
        })?;

        let artifact = self.storage.read(path)?;
        let plaintext = self.cipher.open_artifact(&artifact)?;

        self.storage.write_new(&output, &plaintext, path)?;
        tracing::debug!(source = %path.display(), output = %output.display(), "opened");

        self.finish(path, output, artifact.len(), plaintext.len())
    }

    fn finish(
        &self,
        source: &Path,
        output: PathBuf,
        bytes_in: usize,
        bytes_out: usize,
    ) -> Result<Transformed> {
        if let Err(e) = self.storage.remove(source) {
            return Err(DirSealError::PartialCleanupFailure {
                output,
                leftover: source.to_path_buf(),
                source: e,
            });
        }

        Ok(Transformed {
            source: source.to_path_buf(),
            output,
            bytes_in,
            bytes_out,
        })
    }
}
