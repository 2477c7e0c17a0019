//! Error types for the cipher layer.

use thiserror::Error;

/// Errors that can occur during keystream generation or en/decryption.
///
/// Note what is *not* here: a wrong key, a mismatched round count, or
/// tampered ciphertext all succeed and return wrong plaintext bytes. The
/// cipher has no integrity check; those failures surface as parse errors
/// at the codec layer, or not at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The key was empty. Key scheduling indexes `key[i % key.len()]`,
    /// so at least one key byte is required.
    #[error("encryption key must not be empty")]
    EmptyKey,

    /// The ciphertext is shorter than the IV it must carry.
    #[error("ciphertext too short: need at least {expected} IV bytes, got {actual}")]
    TruncatedCiphertext {
        /// Configured IV length.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
}
