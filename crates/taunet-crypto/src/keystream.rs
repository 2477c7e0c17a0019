//! CipherSaber-2 keystream generation.
//!
//! The generator runs the RC4 key-scheduling pass `rounds` times instead of
//! once, carrying the scheduling index `j` across passes and into stream
//! production. The repeated passes are a deliberate strengthening against
//! short-key weaknesses and must be reproduced exactly, non-reset of `j`
//! included: peers with mismatched round counts derive unrelated streams.

use crate::error::CryptoError;

/// Generate `length` bytes of keystream from `key`, scheduling the state
/// permutation for `rounds` passes.
///
/// Deterministic in all three inputs: two calls with identical arguments
/// produce identical output. The 256-byte permutation and running index are
/// local to the call and discarded afterwards.
///
/// A `rounds` of zero is a valid (if cryptographically worthless)
/// configuration: the stream is produced over the identity permutation.
///
/// # Errors
///
/// - [`CryptoError::EmptyKey`] if `key` is empty.
pub fn keystream(length: usize, key: &[u8], rounds: u32) -> Result<Vec<u8>, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }

    // INVARIANT: `s` holds a permutation of 0..=255 throughout. It starts as
    // the identity and is only ever modified by swaps.
    let mut s: [u8; 256] = std::array::from_fn(|i| i as u8);
    let mut j: u8 = 0;

    for _ in 0..rounds {
        for i in 0..256 {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, usize::from(j));
        }
    }

    // Stream production is byte-for-byte standard RC4 given the carried-over
    // state, with output positions starting at k = 1.
    let mut stream = Vec::with_capacity(length);
    for i in 0..length {
        let k = (i + 1) % 256;
        j = j.wrapping_add(s[k]);
        s.swap(k, usize::from(j));
        stream.push(s[(usize::from(s[k]) + usize::from(s[usize::from(j)])) % 256]);
    }

    Ok(stream)
}
