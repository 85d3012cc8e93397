//! Cryptographic primitives for dirseal.
//!
//! This module provides:
//! - AES-256-GCM sealing and opening with artifact framing (`encryption`)
//! - The zeroizing file key and its providers (`keys`)

pub mod encryption;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Cipher, FileKey, KeyProvider, ...};
pub use encryption::{Cipher, NonceBytes, ARTIFACT_OVERHEAD, NONCE_LEN, TAG_LEN};
pub use keys::{
    EnvKeyProvider, FileKey, FileKeyProvider, KeyEncoding, KeyProvider, StaticKeyProvider, KEY_LEN,
};
