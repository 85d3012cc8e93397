//! The `.enc` file naming convention.
//!
//! The reserved suffix is the only state marker on disk: a file whose
//! name ends in `.enc` is a sealed artifact, anything else is plaintext.
//! All suffix tests live here so the rest of the crate works with the
//! tagged [`Artifact`] value instead of string checks.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix appended to every sealed artifact.
pub const RESERVED_SUFFIX: &str = ".enc";

/// Prefix of the temp files created while a write is in flight.
pub const TEMP_PREFIX: &str = ".dirseal-";

/// What a path holds according to the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Plaintext,
    Ciphertext,
}

impl Artifact {
    pub fn classify(path: &Path) -> Self {
        if path
            .as_os_str()
            .as_encoded_bytes()
            .ends_with(RESERVED_SUFFIX.as_bytes())
        {
            Artifact::Ciphertext
        } else {
            Artifact::Plaintext
        }
    }
}

/// `notes.txt` -> `notes.txt.enc`
pub fn sealed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(RESERVED_SUFFIX);
    PathBuf::from(name)
}

/// `notes.txt.enc` -> `notes.txt`
///
/// Returns `None` when the path carries no suffix or when stripping it
/// would leave an empty file name.
pub fn unsealed_path(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?;
    let stem = strip_suffix(file_name)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

/// Whether `path` is one of our own in-flight temp files.
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.as_encoded_bytes().starts_with(TEMP_PREFIX.as_bytes()))
        .unwrap_or(false)
}

#[cfg(unix)]
fn strip_suffix(name: &OsStr) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    let bytes = name.as_bytes();
    let stem = bytes.strip_suffix(RESERVED_SUFFIX.as_bytes())?;
    Some(OsStr::from_bytes(stem).to_os_string())
}

#[cfg(not(unix))]
fn strip_suffix(name: &OsStr) -> Option<OsString> {
    name.to_str()?
        .strip_suffix(RESERVED_SUFFIX)
        .map(OsString::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_suffix() {
        assert_eq!(Artifact::classify(Path::new("a/notes.txt")), Artifact::Plaintext);
        assert_eq!(Artifact::classify(Path::new("a/notes.txt.enc")), Artifact::Ciphertext);
        assert_eq!(Artifact::classify(Path::new("a/notes.enc.txt")), Artifact::Plaintext);
        assert_eq!(Artifact::classify(Path::new("a/notesenc")), Artifact::Plaintext);
    }

    #[test]
    fn sealed_path_appends_suffix() {
        assert_eq!(
            sealed_path(Path::new("/docs/notes.txt")),
            PathBuf::from("/docs/notes.txt.enc")
        );
        assert_eq!(sealed_path(Path::new("Makefile")), PathBuf::from("Makefile.enc"));
    }

    #[test]
    fn unsealed_path_strips_suffix_once() {
        assert_eq!(
            unsealed_path(Path::new("/docs/notes.txt.enc")),
            Some(PathBuf::from("/docs/notes.txt"))
        );
        assert_eq!(
            unsealed_path(Path::new("/docs/a.enc.enc")),
            Some(PathBuf::from("/docs/a.enc"))
        );
    }

    #[test]
    fn unsealed_path_rejects_bare_suffix_and_plain_names() {
        assert_eq!(unsealed_path(Path::new("/docs/.enc")), None);
        assert_eq!(unsealed_path(Path::new("/docs/notes.txt")), None);
    }

    #[test]
    fn sealed_then_unsealed_is_identity() {
        let original = Path::new("dir/sub/report.pdf");
        assert_eq!(unsealed_path(&sealed_path(original)).as_deref(), Some(original));
    }

    #[test]
    fn temp_files_are_recognised() {
        assert!(is_temp_file(Path::new("/x/.dirseal-abc123")));
        assert!(!is_temp_file(Path::new("/x/dirseal-abc123")));
        assert!(!is_temp_file(Path::new("/x/.dirseal-dir/file")));
    }
}
