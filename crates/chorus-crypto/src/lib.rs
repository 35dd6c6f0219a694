//! Chorus Cryptographic Primitives
//!
//! Cryptographic building blocks for the sender-key group ratchet and for
//! out-of-band identity verification. Pure functions with deterministic
//! outputs. Callers provide random bytes for deterministic testing.
//!
//! # Key Lifecycle
//!
//! Each sender owns one chain per epoch. The chain seed is distributed once
//! to every group member; from then on both sides derive the same sequence
//! of one-time message keys.
//!
//! ```text
//! Chain Key (iteration n)
//!        │
//!        ├── HMAC(seed, 0x01) → message key seed
//!        │          │
//!        │          ▼
//!        │   HKDF("WhisperGroup") → IV ‖ AES-256 key → AES-CBC ciphertext
//!        │
//!        ▼
//! HMAC(seed, 0x02) → Chain Key (iteration n + 1)
//! ```
//!
//! Deriving a message key never advances the chain; advancing is a separate,
//! explicit step. Message keys are used for exactly one encryption or
//! decryption and are zeroized on drop.
//!
//! # Security
//!
//! Forward Secrecy:
//! - HMAC is one-way: a chain key reveals nothing about its predecessors
//! - Old chain keys are zeroized once replaced
//!
//! Authenticity:
//! - Every ciphertext is signed with the epoch's Ed25519 key
//! - Receivers only ever hold the public half
//!
//! Identity Verification:
//! - Fingerprints are iterated SHA-512 digests over canonically ordered
//!   identity keys, compared in constant time

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod fingerprint;
pub mod sender_keys;
pub mod signing;

pub use fingerprint::{
    DEFAULT_ITERATIONS, DisplayableFingerprint, Fingerprint, FingerprintError,
    NumericFingerprintGenerator, SCANNABLE_VERSION, ScannableFingerprint,
};
pub use sender_keys::{
    SenderChainKey, SenderKeyError, SenderMessageKey, decrypt_message, encrypt_message,
};
pub use signing::{IdentityKey, SenderSigningKey, SenderVerifyingKey};
