//! TauNet Cryptographic Primitives
//!
//! This crate provides the stream cipher used by the TauNet protocol: a
//! CipherSaber-2 style RC4 variant with a multi-round key schedule and a
//! cleartext per-message initialization value.
//!
//! # Design
//!
//! All functions in this crate are pure - they have no side effects and
//! produce deterministic outputs given the same inputs. Random bytes required
//! for encryption (the IV) must be provided by the caller, enabling:
//!
//! - Deterministic testing with fixed IVs
//! - Sans-IO architecture compatibility
//! - No coupling to application-level abstractions
//!
//! # Security Properties
//!
//! - Confidentiality only: there is no integrity or authentication tag.
//!   Tampered ciphertext decrypts to wrong bytes, not to an error.
//! - Per-message keystreams: the IV is concatenated to the pre-shared key
//!   before scheduling, so a fresh IV yields a fresh keystream under a
//!   fixed key. IV uniqueness is the caller's responsibility.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod error;
mod keystream;

pub use cipher::{DEFAULT_IV_LENGTH, DEFAULT_ROUNDS, decrypt, encrypt};
pub use error::CryptoError;
pub use keystream::keystream;
