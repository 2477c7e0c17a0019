//! Environment abstraction for randomness.
//!
//! Decouples IV generation from the OS random source. Production code uses
//! [`SystemEnv`]; tests inject a fixed environment to make ciphertexts
//! deterministic. The cipher itself never touches this trait - random
//! bytes always enter through an explicit caller.

/// Abstract source of cryptographically strong random bytes.
///
/// # Safety
///
/// Implementations used outside of tests MUST draw from a
/// cryptographically secure source. IV uniqueness across encryptions -
/// the one invariant the cipher cannot enforce itself - rests on it.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fill the buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Draw a fresh initialization value of `length` bytes.
    fn generate_iv(&self, length: usize) -> Vec<u8> {
        let mut iv = vec![0u8; length];
        self.random_bytes(&mut iv);
        iv
    }
}

/// Production environment backed by the OS CSPRNG (getrandom).
///
/// # Panics
///
/// Panics if the OS RNG fails. This is intentional - a node without
/// functioning cryptographic randomness would reuse or leak IVs, and must
/// not keep operating. RNG failure indicates OS-level breakage and is
/// extremely rare.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot encrypt securely");
    }
}
