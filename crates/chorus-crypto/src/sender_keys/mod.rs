//! Sender-key ratchet primitives
//!
//! - [`SenderChainKey`]: one position in a sender's hash chain
//! - [`SenderMessageKey`]: IV and AES key for exactly one message
//! - [`encrypt_message`] / [`decrypt_message`]: AES-256-CBC with PKCS#7

mod chain;
mod derivation;
mod encryption;
mod error;

pub use chain::{SenderChainKey, SenderMessageKey};
pub use derivation::{CIPHER_KEY_LENGTH, IV_LENGTH};
pub use encryption::{decrypt_message, encrypt_message};
pub use error::SenderKeyError;
