//! Error types for sender-key primitives.

use thiserror::Error;

/// Errors from ratchet derivation, message encryption and signatures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SenderKeyError {
    /// Chain key is at `u32::MAX` and cannot advance
    #[error("iteration overflow: chain key at {current} cannot advance")]
    IterationOverflow {
        /// Iteration of the chain key that was asked to advance
        current: u32,
    },

    /// Ciphertext could not be decrypted (bad length or padding)
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// What went wrong
        reason: String,
    },

    /// Bytes do not encode a usable Ed25519 public key
    #[error("invalid signing key: {reason}")]
    InvalidSigningKey {
        /// What went wrong
        reason: String,
    },

    /// Signature does not verify under the epoch's public key
    #[error("invalid signature")]
    InvalidSignature,
}
