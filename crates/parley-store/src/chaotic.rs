//! Chaotic key store wrapper for fault injection testing
//!
//! Wraps another [`KeyStore`] and randomly fails operations, standing in for
//! a device whose storage is full, disabled, or otherwise unreliable.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use parley_crypto::ConversationKey;

use super::{ConversationId, KeyLookup, KeyStore, StorageError};

const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Key store wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations with
/// `StorageError::Io` at the configured rate. Failures never reach the inner
/// store, so a failed `store` leaves nothing behind.
#[derive(Clone)]
pub struct ChaoticKeyStore<S: KeyStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
    operation_count: Arc<Mutex<usize>>,
}

/// Linear congruential generator, deterministic per seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: KeyStore> ChaoticKeyStore<S> {
    /// Wrap `inner`, failing each operation with probability `failure_rate`.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, DEFAULT_SEED)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of operations attempted, failed ones included.
    pub fn operation_count(&self) -> usize {
        #[allow(clippy::expect_used)]
        *self.operation_count.lock().expect("operation_count mutex poisoned")
    }

    /// Count the operation and decide whether it fails.
    fn inject(&self) -> Result<(), StorageError> {
        #[allow(clippy::expect_used)]
        let mut count = self.operation_count.lock().expect("operation_count mutex poisoned");
        *count += 1;
        drop(count);

        #[allow(clippy::expect_used)]
        let fail = self.rng.lock().expect("ChaoticRng mutex poisoned").should_fail(self.failure_rate);

        if fail {
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: KeyStore> KeyStore for ChaoticKeyStore<S> {
    fn store(
        &self,
        conversation_id: &ConversationId,
        key: &ConversationKey,
    ) -> Result<(), StorageError> {
        self.inject()?;
        self.inner.store(conversation_id, key)
    }

    fn retrieve(&self, conversation_id: &ConversationId) -> Result<KeyLookup, StorageError> {
        self.inject()?;
        self.inner.retrieve(conversation_id)
    }

    fn remove(&self, conversation_id: &ConversationId) -> Result<bool, StorageError> {
        self.inject()?;
        self.inner.remove(conversation_id)
    }

    fn conversation_ids(&self) -> Result<Vec<ConversationId>, StorageError> {
        self.inject()?;
        self.inner.conversation_ids()
    }

    fn clear(&self) -> Result<usize, StorageError> {
        self.inject()?;
        self.inner.clear()
    }
}
