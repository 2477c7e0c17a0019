//! IV-prefixed XOR stream encryption.
//!
//! The cipher XORs the payload with a keystream scheduled from
//! `key ++ iv`, then transmits the IV in clear ahead of the ciphertext.
//! CipherSaber-style designs rely on an unpredictable per-message IV
//! rather than a secret one.

use crate::{error::CryptoError, keystream::keystream};

/// Default number of key-scheduling passes, shared between peers out of band.
pub const DEFAULT_ROUNDS: u32 = 200;

/// Default IV length in bytes, shared between peers out of band.
pub const DEFAULT_IV_LENGTH: usize = 10;

/// Encrypt `plaintext` under `key` with the caller-supplied `iv`.
///
/// Returns `iv ++ (plaintext XOR keystream)`. The IV must be fresh for every
/// message under a given key; callers draw it from a cryptographically
/// strong source (see `taunet_core::Environment`).
///
/// # Errors
///
/// - [`CryptoError::EmptyKey`] if `key` is empty.
pub fn encrypt(
    plaintext: &[u8],
    key: &[u8],
    rounds: u32,
    iv: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }

    let stream = keystream(plaintext.len(), &keyed(key, iv), rounds)?;

    let mut out = Vec::with_capacity(iv.len() + plaintext.len());
    out.extend_from_slice(iv);
    out.extend(plaintext.iter().zip(&stream).map(|(p, s)| p ^ s));
    Ok(out)
}

/// Decrypt `ciphertext` under `key`, splitting the first `iv_length` bytes
/// off as the IV.
///
/// There is no authentication: tampered ciphertext or a wrong key returns
/// wrong plaintext bytes with no error signal at this layer. Integrity is
/// the caller's responsibility.
///
/// # Errors
///
/// - [`CryptoError::EmptyKey`] if `key` is empty.
/// - [`CryptoError::TruncatedCiphertext`] if `ciphertext` cannot carry an
///   IV of `iv_length` bytes.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8],
    rounds: u32,
    iv_length: usize,
) -> Result<Vec<u8>, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }
    if ciphertext.len() < iv_length {
        return Err(CryptoError::TruncatedCiphertext {
            expected: iv_length,
            actual: ciphertext.len(),
        });
    }

    let (iv, body) = ciphertext.split_at(iv_length);
    let stream = keystream(body.len(), &keyed(key, iv), rounds)?;

    Ok(body.iter().zip(&stream).map(|(c, s)| c ^ s).collect())
}

/// Per-message scheduling key: the pre-shared key with the IV appended.
fn keyed(key: &[u8], iv: &[u8]) -> Vec<u8> {
    let mut keyed = Vec::with_capacity(key.len() + iv.len());
    keyed.extend_from_slice(key);
    keyed.extend_from_slice(iv);
    keyed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_vector() {
        // The worked example from the protocol documentation: encrypting
        // "mead" with key "Al", 20 rounds, and the explicit IV "Al Dakota "
        // yields the printable ciphertext "Al Dakota buys".
        let ciphertext = encrypt(b"mead", b"Al", 20, b"Al Dakota ").unwrap();
        assert_eq!(ciphertext, b"Al Dakota buys");

        let plaintext = decrypt(b"Al Dakota buys", b"Al", 20, 10).unwrap();
        assert_eq!(plaintext, b"mead");
    }

    #[test]
    fn output_starts_with_the_iv() {
        let iv = [7u8; 10];
        let ciphertext = encrypt(b"hello", b"key", 200, &iv).unwrap();
        assert_eq!(&ciphertext[..10], &iv);
    }

    #[test]
    fn round_trip() {
        let iv = [0x42u8; 10];
        let ciphertext = encrypt(b"some message body", b"password", 200, &iv).unwrap();
        let plaintext = decrypt(&ciphertext, b"password", 200, 10).unwrap();
        assert_eq!(plaintext, b"some message body");
    }

    #[test]
    fn round_trip_with_empty_payload() {
        let iv = [1u8; 10];
        let ciphertext = encrypt(b"", b"password", 200, &iv).unwrap();
        assert_eq!(ciphertext.len(), 10);
        assert_eq!(decrypt(&ciphertext, b"password", 200, 10).unwrap(), b"");
    }

    #[test]
    fn wrong_key_returns_wrong_bytes_not_an_error() {
        let iv = [9u8; 10];
        let ciphertext = encrypt(b"sixteen byte msg", b"right key", 200, &iv).unwrap();
        let plaintext = decrypt(&ciphertext, b"wrong key", 200, 10).unwrap();
        assert_ne!(plaintext, b"sixteen byte msg");
    }

    #[test]
    fn mismatched_rounds_return_wrong_bytes() {
        let iv = [3u8; 10];
        let ciphertext = encrypt(b"sixteen byte msg", b"key", 200, &iv).unwrap();
        let plaintext = decrypt(&ciphertext, b"key", 20, 10).unwrap();
        assert_ne!(plaintext, b"sixteen byte msg");
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let result = decrypt(b"short", b"key", 200, 10);
        assert_eq!(
            result,
            Err(CryptoError::TruncatedCiphertext { expected: 10, actual: 5 })
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_eq!(encrypt(b"m", b"", 200, &[0; 10]), Err(CryptoError::EmptyKey));
        assert_eq!(decrypt(&[0; 16], b"", 200, 10), Err(CryptoError::EmptyKey));
    }
}
