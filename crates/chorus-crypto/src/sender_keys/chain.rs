//! Sender chain key and the message keys derived from it
//!
//! # Security Properties
//!
//! - Forward Secrecy: `next()` is one-way; a chain key cannot be walked back
//! - Domain Separation: chain and message derivations use distinct constants
//! - Determinism: same seed and iteration always produce the same keys

use std::fmt;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    derivation::{CIPHER_KEY_LENGTH, IV_LENGTH, expand_message_key},
    error::SenderKeyError,
};

type HmacSha256 = Hmac<Sha256>;

/// Constant for deriving a message key seed
const MESSAGE_KEY_SEED: &[u8] = &[0x01];

/// Constant for deriving the next chain key
const CHAIN_KEY_SEED: &[u8] = &[0x02];

/// One position in a sender's hash chain.
///
/// [`message_key()`](Self::message_key) and [`next()`](Self::next) are both
/// pure: neither mutates the chain key, and calling `message_key()` twice
/// yields the same key. The caller decides when to move on and must never
/// use one message key for two messages.
#[derive(Clone, Serialize, Deserialize)]
pub struct SenderChainKey {
    iteration: u32,
    seed: [u8; 32],
}

impl SenderChainKey {
    /// Chain key at `iteration` with the given seed.
    pub fn new(iteration: u32, seed: [u8; 32]) -> Self {
        Self { iteration, seed }
    }

    /// Position of this chain key.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Raw seed, as carried in a distribution message.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// Derive the message key for the current iteration.
    ///
    /// Does not advance the chain.
    pub fn message_key(&self) -> SenderMessageKey {
        SenderMessageKey::derive(self.iteration, hmac(&self.seed, MESSAGE_KEY_SEED))
    }

    /// Derive the chain key for the next iteration.
    ///
    /// # Errors
    ///
    /// `IterationOverflow` if the iteration is already `u32::MAX`.
    pub fn next(&self) -> Result<Self, SenderKeyError> {
        let iteration = self
            .iteration
            .checked_add(1)
            .ok_or(SenderKeyError::IterationOverflow { current: self.iteration })?;

        Ok(Self { iteration, seed: hmac(&self.seed, CHAIN_KEY_SEED) })
    }
}

impl fmt::Debug for SenderChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderChainKey").field("iteration", &self.iteration).finish_non_exhaustive()
    }
}

impl Drop for SenderChainKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// Key material for exactly one message.
///
/// Only the seed is persisted; the IV and cipher key are re-expanded when a
/// cached key is loaded.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "StoredMessageKey", into = "StoredMessageKey")]
pub struct SenderMessageKey {
    iteration: u32,
    iv: [u8; IV_LENGTH],
    cipher_key: [u8; CIPHER_KEY_LENGTH],
    seed: [u8; 32],
}

impl SenderMessageKey {
    /// Expand a message key seed for `iteration`.
    pub fn derive(iteration: u32, seed: [u8; 32]) -> Self {
        let (iv, cipher_key) = expand_message_key(&seed);
        Self { iteration, iv, cipher_key, seed }
    }

    /// Iteration this key belongs to.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// 16-byte AES-CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_LENGTH] {
        &self.iv
    }

    /// 32-byte AES-256 key.
    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_LENGTH] {
        &self.cipher_key
    }

    /// Seed the IV and key were expanded from.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }
}

impl fmt::Debug for SenderMessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderMessageKey").field("iteration", &self.iteration).finish_non_exhaustive()
    }
}

impl Drop for SenderMessageKey {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.cipher_key.zeroize();
        self.seed.zeroize();
    }
}

/// Serialized form of a message key. Only the seed is stored; the IV and
/// cipher key are rederived on load.
#[derive(Serialize, Deserialize)]
struct StoredMessageKey {
    iteration: u32,
    seed: [u8; 32],
}

impl Zeroize for StoredMessageKey {
    fn zeroize(&mut self) {
        self.seed.zeroize();
    }
}

impl Drop for StoredMessageKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for StoredMessageKey {}

impl From<StoredMessageKey> for SenderMessageKey {
    fn from(stored: StoredMessageKey) -> Self {
        Self::derive(stored.iteration, stored.seed)
    }
}

impl From<SenderMessageKey> for StoredMessageKey {
    fn from(key: SenderMessageKey) -> Self {
        Self { iteration: key.iteration, seed: key.seed }
    }
}

fn hmac(key: &[u8; 32], input: &[u8]) -> [u8; 32] {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(input);
    let result = mac.finalize().into_bytes();

    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = i as u8;
        }
        seed
    }

    #[test]
    fn message_key_is_deterministic() {
        let chain_key = SenderChainKey::new(0, test_seed());

        let first = chain_key.message_key();
        let second = chain_key.message_key();

        assert_eq!(first.iv(), second.iv());
        assert_eq!(first.cipher_key(), second.cipher_key());
        assert_eq!(first.iteration(), 0);
    }

    #[test]
    fn message_key_does_not_advance_chain() {
        let chain_key = SenderChainKey::new(3, test_seed());
        let _ = chain_key.message_key();

        assert_eq!(chain_key.iteration(), 3);
        assert_eq!(chain_key.seed(), &test_seed());
    }

    #[test]
    fn next_increments_iteration() {
        let chain_key = SenderChainKey::new(0, test_seed());

        let next = chain_key.next().unwrap();
        assert_eq!(next.iteration(), 1);
        assert_eq!(next.next().unwrap().iteration(), 2);
    }

    #[test]
    fn next_and_message_key_are_domain_separated() {
        let chain_key = SenderChainKey::new(0, test_seed());

        let next_seed = *chain_key.next().unwrap().seed();
        let message_seed = *chain_key.message_key().seed();

        assert_ne!(next_seed, message_seed);
        assert_ne!(&next_seed, chain_key.seed());
    }

    #[test]
    fn successive_message_keys_are_unique() {
        let key0 = SenderChainKey::new(0, test_seed());
        let key1 = key0.next().unwrap();
        let key2 = key1.next().unwrap();

        let mk0 = key0.message_key();
        let mk1 = key1.message_key();
        let mk2 = key2.message_key();

        assert_ne!(mk0.cipher_key(), mk1.cipher_key(), "keys must be unique");
        assert_ne!(mk1.cipher_key(), mk2.cipher_key(), "keys must be unique");
        assert_ne!(mk0.iv(), mk2.iv(), "IVs must be unique");
    }

    #[test]
    fn chain_is_deterministic() {
        let mut a = SenderChainKey::new(0, test_seed());
        let mut b = SenderChainKey::new(0, test_seed());

        for _ in 0..10 {
            a = a.next().unwrap();
            b = b.next().unwrap();
            assert_eq!(a.seed(), b.seed(), "same seed must produce same chain");
        }
    }

    #[test]
    fn seed_derivation_matches_hmac_constants() {
        let seed = test_seed();
        let chain_key = SenderChainKey::new(0, seed);

        assert_eq!(chain_key.next().unwrap().seed(), &hmac(&seed, &[0x02]));
        assert_eq!(chain_key.message_key().seed(), &hmac(&seed, &[0x01]));
    }

    #[test]
    fn next_rejects_overflow() {
        let chain_key = SenderChainKey::new(u32::MAX, test_seed());

        assert_eq!(
            chain_key.next().unwrap_err(),
            SenderKeyError::IterationOverflow { current: u32::MAX }
        );
    }

    #[test]
    fn message_key_rederives_from_seed() {
        let original = SenderChainKey::new(9, test_seed()).message_key();
        let rebuilt = SenderMessageKey::derive(original.iteration(), *original.seed());

        assert_eq!(rebuilt.iv(), original.iv());
        assert_eq!(rebuilt.cipher_key(), original.cipher_key());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let chain_key = SenderChainKey::new(1, [0xEE; 32]);
        let rendered = format!("{chain_key:?} {:?}", chain_key.message_key());

        assert!(!rendered.contains("238"));
        assert!(rendered.contains("iteration: 1"));
    }

    #[test]
    fn stored_message_key_is_scrubbed() {
        fn zeroized_on_drop<T: ZeroizeOnDrop>() {}
        zeroized_on_drop::<StoredMessageKey>();

        let original = SenderChainKey::new(4, test_seed()).message_key();
        let mut stored = StoredMessageKey::from(original.clone());
        assert_eq!(stored.iteration, 4);
        assert_eq!(&stored.seed, original.seed());

        stored.zeroize();
        assert_eq!(stored.seed, [0u8; 32]);
    }

    #[test]
    fn stored_message_key_rebuilds_same_key() {
        let original = SenderChainKey::new(4, test_seed()).message_key();
        let rebuilt = SenderMessageKey::from(StoredMessageKey::from(original.clone()));

        assert_eq!(rebuilt.iteration(), 4);
        assert_eq!(rebuilt.cipher_key(), original.cipher_key());
        assert_eq!(rebuilt.iv(), original.iv());
    }
}
