//! Chaotic storage wrapper for fault injection testing
//!
//! Store wrapper that randomly fails operations to test that a failed store
//! leaves the persisted record untouched and that errors reach the caller
//! unchanged.

use std::sync::{Arc, Mutex, PoisonError};

use super::{SenderKeyStore, StorageError};
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// Chaotic store wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations based on a
/// configured failure rate. A failing operation never reaches the inner
/// store, so it cannot leave a partial write behind.
#[derive(Clone)]
pub struct ChaoticStore<S: SenderKeyStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state and operation counter
    chaos: Arc<Mutex<ChaosState>>,
}

struct ChaosState {
    rng: ChaoticRng,
    operations: usize,
    failures: usize,
}

/// Simple deterministic RNG for chaos injection
///
/// Uses linear congruential generator (LCG) for fast, deterministic randomness.
/// This ensures chaos tests are reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next random value [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: SenderKeyStore> ChaoticStore<S> {
    /// Create a new chaotic store wrapper
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
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
            chaos: Arc::new(Mutex::new(ChaosState {
                rng: ChaoticRng::new(seed),
                operations: 0,
                failures: 0,
            })),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of store operations attempted.
    pub fn operation_count(&self) -> usize {
        self.chaos.lock().unwrap_or_else(PoisonError::into_inner).operations
    }

    /// Number of operations that were failed on purpose.
    pub fn failure_count(&self) -> usize {
        self.chaos.lock().unwrap_or_else(PoisonError::into_inner).failures
    }

    /// Count the operation and decide whether it fails.
    fn roll(&self) -> Result<(), StorageError> {
        let mut chaos = self.chaos.lock().unwrap_or_else(PoisonError::into_inner);
        chaos.operations += 1;

        if chaos.rng.next() < self.failure_rate {
            chaos.failures += 1;
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }

        Ok(())
    }
}

impl<S: SenderKeyStore> SenderKeyStore for ChaoticStore<S> {
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<SenderKeyRecord, StorageError> {
        self.roll()?;
        self.inner.load_sender_key(name)
    }

    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StorageError> {
        self.roll()?;
        self.inner.store_sender_key(name, record)
    }

    fn remove_sender_key(&self, name: &SenderKeyName) -> Result<(), StorageError> {
        self.roll()?;
        self.inner.remove_sender_key(name)
    }
}
