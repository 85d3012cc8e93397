use std::path::PathBuf;

use thiserror::Error;

use crate::transform::Mode;

/// All errors that can occur in dirseal.
#[derive(Debug, Error)]
pub enum DirSealError {
    // --- Key errors ---
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // --- Crypto errors ---
    #[error("Nonce generation failed: {0}")]
    NonceGeneration(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed — wrong key or tampered data")]
    AuthFailure,

    #[error("Malformed ciphertext: {len} bytes is shorter than the 12-byte nonce")]
    MalformedCiphertext { len: usize },

    // --- File lifecycle errors ---
    #[error("Failed to {action} {}: {source}", .path.display())]
    FileIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("{} is not a valid input for {mode}", .path.display())]
    WrongArtifactKind { path: PathBuf, mode: Mode },

    #[error(
        "Wrote {} but could not remove {}: {source} — both files now exist",
        .output.display(),
        .leftover.display()
    )]
    PartialCleanupFailure {
        output: PathBuf,
        leftover: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Could not make {} durable ({sync}) and could not remove it: {source} — both {} and {} now exist",
        .output.display(),
        .output.display(),
        .source_file.display()
    )]
    RollbackFailed {
        output: PathBuf,
        source_file: PathBuf,
        sync: std::io::Error,
        #[source]
        source: std::io::Error,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("No root directories given — pass ROOTS or set `roots` in the config file")]
    NoRoots,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Coarse classification used when counting per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidKey,
    Io,
    Auth,
    Malformed,
    PartialCleanup,
    Other,
}

impl DirSealError {
    /// Shorthand for building a [`DirSealError::FileIo`].
    pub fn file_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidKey(_) => FailureKind::InvalidKey,
            Self::FileIo { .. } | Self::Io(_) | Self::DestinationExists(_) => FailureKind::Io,
            Self::AuthFailure => FailureKind::Auth,
            Self::MalformedCiphertext { .. } => FailureKind::Malformed,
            Self::PartialCleanupFailure { .. } | Self::RollbackFailed { .. } => {
                FailureKind::PartialCleanup
            }
            _ => FailureKind::Other,
        }
    }

    /// Whether the failure should be reported as a warning rather than an error.
    ///
    /// Integrity failures and leftover sources never lose data, but operators
    /// need to tell them apart from disk errors.
    pub fn is_warning(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Auth | FailureKind::Malformed | FailureKind::PartialCleanup
        )
    }
}

/// Convenience type alias for dirseal results.
pub type Result<T> = std::result::Result<T, DirSealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_failures_are_warnings() {
        assert!(DirSealError::AuthFailure.is_warning());
        assert!(DirSealError::MalformedCiphertext { len: 3 }.is_warning());
        let cleanup = DirSealError::PartialCleanupFailure {
            output: PathBuf::from("a.enc"),
            leftover: PathBuf::from("a"),
            source: std::io::Error::other("busy"),
        };
        assert!(cleanup.is_warning());
    }

    #[test]
    fn failed_rollback_says_both_files_exist() {
        let err = DirSealError::RollbackFailed {
            output: PathBuf::from("a.enc"),
            source_file: PathBuf::from("a"),
            sync: std::io::Error::other("fsync"),
            source: std::io::Error::other("busy"),
        };
        assert_eq!(err.kind(), FailureKind::PartialCleanup);
        assert!(err.to_string().contains("both a.enc and a now exist"));
    }

    #[test]
    fn disk_errors_are_not_warnings() {
        let err = DirSealError::file_io("read", "a", std::io::Error::other("boom"));
        assert_eq!(err.kind(), FailureKind::Io);
        assert!(!err.is_warning());
        assert_eq!(
            DirSealError::DestinationExists(PathBuf::from("a.enc")).kind(),
            FailureKind::Io
        );
    }

    #[test]
    fn file_io_message_names_path() {
        let err = DirSealError::file_io(
            "write",
            "/tmp/x.enc",
            std::io::Error::other("disk full"),
        );
        let msg = err.to_string();
        assert!(msg.contains("write"));
        assert!(msg.contains("/tmp/x.enc"));
        assert!(msg.contains("disk full"));
    }
}
