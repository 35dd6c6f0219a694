//! Error types for group session operations.
//!
//! The variants mirror how a caller is expected to react: a duplicate is a
//! benign no-op, an invalid or legacy message is dropped and logged, a
//! missing session means a distribution message has not been processed yet.

use chorus_crypto::SenderKeyError;
use chorus_proto::ProtocolError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by [`GroupSessionBuilder`](crate::GroupSessionBuilder) and
/// [`GroupCipher`](crate::GroupCipher).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// No epoch exists for the sender, or none matches the message's key id
    #[error("no sender key session")]
    NoSession,

    /// Iteration was already consumed (replay or double delivery)
    #[error("duplicate message: key id {key_id}, iteration {iteration}")]
    DuplicateMessage {
        /// Epoch the message belongs to
        key_id: u32,
        /// Iteration that was already consumed
        iteration: u32,
    },

    /// Malformed framing, bad signature, bad padding or an excessive
    /// iteration gap
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Message was produced by an older protocol version
    #[error("legacy message version: {version}")]
    LegacyMessage {
        /// Version nibble found on the wire
        version: u8,
    },

    /// Newest epoch was received from someone else, so this device holds no
    /// private signing key for it
    #[error("epoch {key_id} was not originated by this device")]
    NotOriginator {
        /// Epoch that cannot be used for sending
        key_id: u32,
    },

    /// Ratchet policy rejected at construction
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Plaintext callback refused the message; state was not persisted
    #[error("plaintext callback failed: {0}")]
    Callback(String),

    /// Key store failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl GroupError {
    /// Returns true for a replayed or redelivered message.
    ///
    /// Callers should drop such messages silently.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateMessage { .. })
    }

    /// Returns true if the message itself is unusable and should be dropped
    /// and logged as possible tampering or corruption.
    ///
    /// Duplicates, missing sessions and storage failures are not fatal for
    /// the message: the same bytes may succeed later or are already handled.
    pub fn is_fatal_for_message(&self) -> bool {
        matches!(self, Self::InvalidMessage(_) | Self::LegacyMessage { .. })
    }
}

impl From<ProtocolError> for GroupError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::LegacyVersion(version) => Self::LegacyMessage { version },
            other => Self::InvalidMessage(other.to_string()),
        }
    }
}

impl From<SenderKeyError> for GroupError {
    fn from(err: SenderKeyError) -> Self {
        Self::InvalidMessage(err.to_string())
    }
}
