//! Fuzz target for keystream generation
//!
//! Arbitrary keys, round counts, and lengths must never panic the
//! generator - the only rejected input is an empty key, via an error.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<u8>, u8, u16)| {
    let (key, rounds, length) = input;
    let _ = taunet_crypto::keystream(usize::from(length), &key, u32::from(rounds));
});
