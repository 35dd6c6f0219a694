//! One ratchet epoch.
//!
//! An epoch starts from a chain seed and a signing key. The device that
//! created it holds the private signing key and can send; every other
//! member holds only the public half and can only receive.
//!
//! ```text
//! SenderKeyState
//! ├── key_id          echoed in every message of this epoch
//! ├── chain_key       (iteration, seed), only moves forward
//! ├── signing_key     Originated(private) | Received(public)
//! └── message_keys    iteration → key, derived ahead of need
//! ```

use std::{collections::BTreeMap, fmt};

use chorus_crypto::{SenderChainKey, SenderMessageKey, SenderSigningKey, SenderVerifyingKey};
use chorus_proto::SenderKeyDistributionMessage;
use serde::{Deserialize, Serialize};

use crate::error::GroupError;

/// Signing half of an epoch.
///
/// Only [`Originated`](Self::Originated) carries a private key, so sending
/// with a received epoch cannot produce a signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EpochSigningKey {
    /// Epoch created on this device
    Originated(SenderSigningKey),
    /// Epoch learned from a distribution message
    Received(SenderVerifyingKey),
}

impl EpochSigningKey {
    /// Public key that verifies this epoch's messages.
    pub fn verifying_key(&self) -> SenderVerifyingKey {
        match self {
            Self::Originated(signing_key) => signing_key.verifying_key(),
            Self::Received(verifying_key) => *verifying_key,
        }
    }

    /// Private key, present only for epochs this device created.
    pub fn signing_key(&self) -> Option<&SenderSigningKey> {
        match self {
            Self::Originated(signing_key) => Some(signing_key),
            Self::Received(_) => None,
        }
    }
}

/// State of one epoch.
///
/// # Invariants
///
/// - `chain_key.iteration()` never decreases
/// - Every cached message key has an iteration below the chain position
/// - A cached message key is handed out at most once
#[derive(Clone, Serialize, Deserialize)]
pub struct SenderKeyState {
    key_id: u32,
    chain_key: SenderChainKey,
    signing_key: EpochSigningKey,
    message_keys: BTreeMap<u32, SenderMessageKey>,
}

impl SenderKeyState {
    /// Fresh epoch created on this device.
    pub fn originated(key_id: u32, chain_key: SenderChainKey, signing_key: SenderSigningKey) -> Self {
        Self {
            key_id,
            chain_key,
            signing_key: EpochSigningKey::Originated(signing_key),
            message_keys: BTreeMap::new(),
        }
    }

    /// Epoch announced by another device.
    pub fn received(
        key_id: u32,
        chain_key: SenderChainKey,
        verifying_key: SenderVerifyingKey,
    ) -> Self {
        Self {
            key_id,
            chain_key,
            signing_key: EpochSigningKey::Received(verifying_key),
            message_keys: BTreeMap::new(),
        }
    }

    /// Epoch described by a distribution message.
    ///
    /// # Errors
    ///
    /// `InvalidMessage` if the signing key is not a valid Ed25519 point.
    pub fn from_distribution(message: &SenderKeyDistributionMessage) -> Result<Self, GroupError> {
        let verifying_key = SenderVerifyingKey::from_bytes(message.signing_key())?;
        let chain_key = SenderChainKey::new(message.iteration(), *message.chain_key());

        Ok(Self::received(message.key_id(), chain_key, verifying_key))
    }

    /// Epoch identifier.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Current chain position.
    pub fn chain_key(&self) -> &SenderChainKey {
        &self.chain_key
    }

    /// Move the chain to a later position.
    pub(crate) fn set_chain_key(&mut self, chain_key: SenderChainKey) {
        debug_assert!(chain_key.iteration() >= self.chain_key.iteration());
        self.chain_key = chain_key;
    }

    /// Signing half of the epoch.
    pub fn signing_key(&self) -> &EpochSigningKey {
        &self.signing_key
    }

    /// Public key that verifies this epoch's messages.
    pub fn verifying_key(&self) -> SenderVerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Whether this device created the epoch.
    pub fn is_originated(&self) -> bool {
        matches!(self.signing_key, EpochSigningKey::Originated(_))
    }

    /// Distribution message announcing the current chain position.
    pub fn distribution_message(&self) -> SenderKeyDistributionMessage {
        SenderKeyDistributionMessage::new(
            self.key_id,
            self.chain_key.iteration(),
            *self.chain_key.seed(),
            self.verifying_key().to_bytes(),
        )
    }

    /// Whether a skipped key for `iteration` is cached.
    pub fn has_message_key(&self, iteration: u32) -> bool {
        self.message_keys.contains_key(&iteration)
    }

    /// Number of cached skipped keys.
    pub fn message_key_count(&self) -> usize {
        self.message_keys.len()
    }

    /// Cache a skipped key, evicting the lowest iterations beyond
    /// `max_keys`.
    pub(crate) fn add_message_key(&mut self, message_key: SenderMessageKey, max_keys: usize) {
        self.message_keys.insert(message_key.iteration(), message_key);

        while self.message_keys.len() > max_keys {
            if let Some((evicted, _)) = self.message_keys.pop_first() {
                tracing::trace!(key_id = self.key_id, evicted, "evicted skipped message key");
            }
        }
    }

    /// Take a cached key out of the cache. It cannot be served twice.
    pub(crate) fn remove_message_key(&mut self, iteration: u32) -> Option<SenderMessageKey> {
        self.message_keys.remove(&iteration)
    }
}

impl fmt::Debug for SenderKeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderKeyState")
            .field("key_id", &self.key_id)
            .field("iteration", &self.chain_key.iteration())
            .field("originated", &self.is_originated())
            .field("message_keys", &self.message_keys.len())
            .finish()
    }
}
