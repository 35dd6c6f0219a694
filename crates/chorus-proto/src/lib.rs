//! Chorus Wire Formats
//!
//! Serialized messages exchanged by the sender-key protocol. This crate only
//! frames bytes: it never holds key material and never verifies signatures.
//! Authentication is layered on top by `chorus-core`.
//!
//! # Messages
//!
//! - [`SenderKeyMessage`]: one signed group ciphertext
//! - [`SenderKeyDistributionMessage`]: bootstrap for a sender's ratchet epoch
//! - [`CombinedFingerprints`]: the QR-code payload used for identity
//!   verification
//!
//! ```text
//! SenderKeyMessage
//! ┌─────────┬────────────────────────────────────┬──────────────┐
//! │ version │ protobuf { id, iteration, ct }     │ signature    │
//! │ 1 byte  │ varints + length-prefixed bytes    │ 64 bytes     │
//! └─────────┴────────────────────────────────────┴──────────────┘
//!  \__________________ signed _________________/
//! ```
//!
//! Parsing is total: arbitrary input produces either a message or a
//! [`ProtocolError`], never a panic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod distribution;
mod errors;
mod fingerprint;
mod message;
mod version;

pub use distribution::{CHAIN_KEY_LENGTH, SIGNING_KEY_LENGTH, SenderKeyDistributionMessage};
pub use errors::{ProtocolError, Result};
pub use fingerprint::CombinedFingerprints;
pub use message::{SIGNATURE_LENGTH, SenderKeyMessage, UnsignedSenderKeyMessage};
pub use version::CURRENT_VERSION;
