//! AES-256-GCM authenticated encryption.
//!
//! `Cipher` wraps an initialised AES-256-GCM instance for one key and
//! exposes the raw `seal`/`open` pair plus the artifact framing used on
//! disk.  Each call to `seal_artifact` draws a fresh random 12-byte nonce
//! and prepends it to the output; `open_artifact` splits it back out.
//!
//! Layout of a sealed artifact:
//!   [ 12-byte nonce | ciphertext | 16-byte auth tag ]

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use super::keys::{FileKey, KEY_LEN};
use crate::errors::{DirSealError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Bytes a sealed artifact adds on top of the plaintext.
pub const ARTIFACT_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// A nonce as stored in front of every artifact.
pub type NonceBytes = [u8; NONCE_LEN];

/// AES-256-GCM bound to a single key.
///
/// Cheap to share between threads: sealing and opening take `&self`.
#[derive(Clone)]
pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    /// Build a cipher from a validated key.
    pub fn new(key: &FileKey) -> Self {
        Self {
            inner: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Build a cipher from raw key bytes, rejecting anything but 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let inner = Aes256Gcm::new_from_slice(key).map_err(|_| {
            DirSealError::InvalidKey(format!(
                "AES-256 requires a {KEY_LEN}-byte key, got {} bytes",
                key.len()
            ))
        })?;
        Ok(Self { inner })
    }

    /// Draw a fresh nonce from the operating system CSPRNG.
    ///
    /// There is no fallback: if the OS source fails, so does the caller.
    pub fn generate_nonce() -> Result<NonceBytes> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| DirSealError::NonceGeneration(e.to_string()))?;
        Ok(nonce)
    }

    /// Encrypt and authenticate `plaintext`, returning ciphertext || tag.
    pub fn seal(&self, nonce: &NonceBytes, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.inner
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| DirSealError::EncryptionFailed(format!("encryption error: {e}")))
    }

    /// Verify and decrypt ciphertext || tag.
    ///
    /// Inputs too short to hold a tag fail the same way a bad tag does.
    pub fn open(&self, nonce: &NonceBytes, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if ciphertext.len() < TAG_LEN {
            return Err(DirSealError::AuthFailure);
        }

        let plaintext = self
            .inner
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DirSealError::AuthFailure)?;

        Ok(Zeroizing::new(plaintext))
    }

    /// Seal `plaintext` under a fresh nonce and return nonce || ciphertext || tag.
    pub fn seal_artifact(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Self::generate_nonce()?;
        let sealed = self.seal(&nonce, plaintext)?;

        let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    /// Open data produced by `seal_artifact`.
    pub fn open_artifact(&self, artifact: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if artifact.len() < NONCE_LEN {
            return Err(DirSealError::MalformedCiphertext {
                len: artifact.len(),
            });
        }

        let (nonce_bytes, ciphertext) = artifact.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        self.open(&nonce, ciphertext)
    }
}
