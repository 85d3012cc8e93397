//! The file-encryption key and where it comes from.
//!
//! A run needs exactly one 32-byte key.  It is resolved once, up front,
//! by a [`KeyProvider`] and then passed explicitly to the transformer;
//! nothing below the CLI ever reads process-wide state to find it.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{DirSealError, Result};

/// Length of the AES-256 key (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte key that zeroes its memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey {
    bytes: [u8; KEY_LEN],
}

impl FileKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of a slice, failing on any length but 32.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(DirSealError::InvalidKey(format!(
                "AES-256 requires a {KEY_LEN}-byte key, got {} bytes",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        let out = Self::new(key);
        key.zeroize();
        Ok(out)
    }

    /// Interpret a configured value according to `encoding`.
    pub fn decode(value: &[u8], encoding: KeyEncoding) -> Result<Self> {
        match encoding {
            KeyEncoding::Raw => Self::from_slice(value),
            KeyEncoding::Base64 => {
                let text = std::str::from_utf8(value)
                    .map_err(|_| DirSealError::InvalidKey("base64 key is not valid UTF-8".into()))?;
                let decoded = Zeroizing::new(
                    BASE64
                        .decode(text.trim())
                        .map_err(|e| DirSealError::InvalidKey(format!("bad base64 key: {e}")))?,
                );
                Self::from_slice(&decoded)
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FileKey([REDACTED])")
    }
}

/// How a key value is written in its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// The value's bytes are the key (exactly 32 of them).
    #[default]
    Raw,
    /// Standard base64 of the 32 key bytes.
    Base64,
}

/// Something that can hand out the run's key.
pub trait KeyProvider {
    fn provide(&self) -> Result<FileKey>;
}

/// Reads the key from a single environment variable.
pub struct EnvKeyProvider {
    pub var: String,
    pub encoding: KeyEncoding,
}

impl KeyProvider for EnvKeyProvider {
    fn provide(&self) -> Result<FileKey> {
        let value = std::env::var_os(&self.var).ok_or_else(|| {
            DirSealError::InvalidKey(format!("environment variable {} is not set", self.var))
        })?;
        let bytes = Zeroizing::new(value.into_encoded_bytes());
        FileKey::decode(&bytes, self.encoding)
            .map_err(|e| with_source_name(e, &format!("${}", self.var)))
    }
}

/// Reads the key from a file on disk.
pub struct FileKeyProvider {
    pub path: PathBuf,
    pub encoding: KeyEncoding,
}

impl KeyProvider for FileKeyProvider {
    fn provide(&self) -> Result<FileKey> {
        let bytes = Zeroizing::new(fs::read(&self.path).map_err(|e| {
            DirSealError::InvalidKey(format!(
                "cannot read key file {}: {e}",
                self.path.display()
            ))
        })?);
        FileKey::decode(&bytes, self.encoding)
            .map_err(|e| with_source_name(e, &self.path.display().to_string()))
    }
}

/// A fixed key, for embedding and tests.
pub struct StaticKeyProvider(pub FileKey);

impl KeyProvider for StaticKeyProvider {
    fn provide(&self) -> Result<FileKey> {
        Ok(self.0.clone())
    }
}

fn with_source_name(err: DirSealError, source: &str) -> DirSealError {
    match err {
        DirSealError::InvalidKey(msg) => DirSealError::InvalidKey(format!("{source}: {msg}")),
        other => other,
    }
}
