//! Environment abstraction for randomness.
//!
//! Decouples key and nonce generation from the OS. Production code uses
//! [`SystemEnv`]; tests plug in deterministic sources.

/// Source of randomness used for key and nonce generation.
///
/// # Security
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Two calls never return the same bytes in production (nonce uniqueness
///   relies on this)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random fixed-size array.
    ///
    /// Convenience wrapper used for nonces and key material.
    fn random_array<const N: usize>(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}

/// Production environment backed by the OS CSPRNG.
///
/// Uses getrandom (e.g. `getrandom(2)` on Linux, `BCryptGenRandom` on
/// Windows).
///
/// # Panics
///
/// Panics if the OS RNG fails. A client without working randomness cannot
/// produce safe nonces or keys, and continuing would risk nonce reuse.
#[derive(Debug, Clone, Copy, Default)]
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
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate nonces or keys");
    }
}
