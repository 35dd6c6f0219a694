//! Ed25519 keys for ciphertext authentication and identity verification.
//!
//! The private half of an epoch's signing key exists only on the device that
//! created the epoch. [`SenderSigningKey`] is the only type that can produce
//! a signature, so code holding a received epoch (a [`SenderVerifyingKey`])
//! cannot sign by construction.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::sender_keys::SenderKeyError;

/// Length of a serialized Ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Private signing key of an epoch this device originated.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderSigningKey(SigningKey);

impl SenderSigningKey {
    /// Build a signing key from 32 bytes of secret randomness.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Public half, safe to distribute.
    pub fn verifying_key(&self) -> SenderVerifyingKey {
        SenderVerifyingKey(self.0.verifying_key())
    }

    /// Sign `message` (deterministic Ed25519).
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.0.sign(message).to_bytes()
    }
}

impl fmt::Debug for SenderSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SenderSigningKey").field(&self.verifying_key()).finish()
    }
}

/// Public signing key of an epoch, held by every receiver.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderVerifyingKey(VerifyingKey);

impl SenderVerifyingKey {
    /// Parse a 32-byte compressed Edwards point.
    ///
    /// # Errors
    ///
    /// `InvalidSigningKey` if the bytes do not decompress to a curve point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, SenderKeyError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|err| SenderKeyError::InvalidSigningKey { reason: err.to_string() })
    }

    /// Compressed point encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Verify a signature over `message`.
    ///
    /// Uses strict verification, rejecting small-order keys and
    /// non-canonical signatures.
    ///
    /// # Errors
    ///
    /// `InvalidSignature` if the signature does not verify.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Result<(), SenderKeyError> {
        let signature = Signature::from_bytes(signature);
        self.0.verify_strict(message, &signature).map_err(|_| SenderKeyError::InvalidSignature)
    }
}

impl fmt::Debug for SenderVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SenderVerifyingKey({})", hex_prefix(&self.to_bytes()))
    }
}

/// Long-term identity public key of a device, as compared in fingerprints.
///
/// Ordered by serialized bytes, which is the canonical order used when a
/// party has several identity keys.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(VerifyingKey);

impl IdentityKey {
    /// Parse a 32-byte compressed Edwards point.
    ///
    /// # Errors
    ///
    /// `InvalidSigningKey` if the bytes do not decompress to a curve point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, SenderKeyError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|err| SenderKeyError::InvalidSigningKey { reason: err.to_string() })
    }

    /// Public identity key belonging to a private Ed25519 key seed.
    pub fn from_private_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed).verifying_key())
    }

    /// Serialized form fed into fingerprint hashes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }
}

impl PartialOrd for IdentityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IdentityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_bytes().hash(state);
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({})", hex_prefix(&self.to_bytes()))
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|byte| format!("{byte:02x}")).collect()
}
