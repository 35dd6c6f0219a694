//! Signed group ciphertext.

use prost::Message;

use crate::{
    errors::{ProtocolError, Result},
    version::{check_version, version_byte},
};

/// Length of the trailing Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Smallest possible serialized message: version byte plus signature.
const MIN_LENGTH: usize = 1 + SIGNATURE_LENGTH;

#[derive(Clone, PartialEq, Message)]
struct SenderKeyMessageProto {
    #[prost(uint32, optional, tag = "1")]
    id: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    iteration: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    ciphertext: Option<Vec<u8>>,
}

/// A group ciphertext whose header has been encoded but not yet signed.
///
/// Produced by the sender, signed over [`signed_bytes`](Self::signed_bytes),
/// then turned into a [`SenderKeyMessage`] with [`seal`](Self::seal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedSenderKeyMessage {
    key_id: u32,
    iteration: u32,
    ciphertext: Vec<u8>,
    signed_bytes: Vec<u8>,
}

impl UnsignedSenderKeyMessage {
    /// Encode the version byte and protobuf body for a ciphertext.
    pub fn new(key_id: u32, iteration: u32, ciphertext: Vec<u8>) -> Self {
        let body = SenderKeyMessageProto {
            id: Some(key_id),
            iteration: Some(iteration),
            ciphertext: Some(ciphertext.clone()),
        };

        let mut signed_bytes = Vec::with_capacity(1 + body.encoded_len() + SIGNATURE_LENGTH);
        signed_bytes.push(version_byte());
        signed_bytes.extend_from_slice(&body.encode_to_vec());

        Self { key_id, iteration, ciphertext, signed_bytes }
    }

    /// Bytes the signature must cover: version byte and protobuf body.
    pub fn signed_bytes(&self) -> &[u8] {
        &self.signed_bytes
    }

    /// Append the signature, producing the final wire message.
    pub fn seal(self, signature: [u8; SIGNATURE_LENGTH]) -> SenderKeyMessage {
        let mut serialized = self.signed_bytes;
        serialized.extend_from_slice(&signature);

        SenderKeyMessage {
            key_id: self.key_id,
            iteration: self.iteration,
            ciphertext: self.ciphertext,
            signature,
            serialized,
        }
    }
}

/// Signed group ciphertext as carried on the wire.
///
/// Layout: `[version: 1 byte] [protobuf body] [signature: 64 bytes]`.
///
/// # Security
///
/// Parsing only establishes structural validity. The signature has NOT been
/// verified; callers must check it against the epoch's public signing key
/// before trusting `key_id`, `iteration` or `ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderKeyMessage {
    key_id: u32,
    iteration: u32,
    ciphertext: Vec<u8>,
    signature: [u8; SIGNATURE_LENGTH],
    serialized: Vec<u8>,
}

impl SenderKeyMessage {
    /// Parse a serialized message.
    ///
    /// # Errors
    ///
    /// - `Truncated` if shorter than the version byte plus signature
    /// - `LegacyVersion` / `UnknownVersion` for a foreign version byte
    /// - `Decode` / `MissingField` for a malformed body
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_LENGTH {
            return Err(ProtocolError::Truncated { actual: bytes.len(), minimum: MIN_LENGTH });
        }

        check_version(bytes[0])?;

        let body_end = bytes.len() - SIGNATURE_LENGTH;
        let body = SenderKeyMessageProto::decode(&bytes[1..body_end])?;

        let key_id = body.id.ok_or(ProtocolError::MissingField("id"))?;
        let iteration = body.iteration.ok_or(ProtocolError::MissingField("iteration"))?;
        let ciphertext = body.ciphertext.ok_or(ProtocolError::MissingField("ciphertext"))?;

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature.copy_from_slice(&bytes[body_end..]);

        Ok(Self { key_id, iteration, ciphertext, signature, serialized: bytes.to_vec() })
    }

    /// Epoch identifier of the sender's ratchet.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Ratchet iteration the ciphertext was encrypted at.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// AES-CBC ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Ed25519 signature over [`signed_bytes`](Self::signed_bytes).
    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    /// Exact bytes covered by the signature.
    pub fn signed_bytes(&self) -> &[u8] {
        &self.serialized[..self.serialized.len() - SIGNATURE_LENGTH]
    }

    /// Full wire encoding.
    pub fn serialize(&self) -> &[u8] {
        &self.serialized
    }

    /// Consume the message, returning its wire encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.serialized
    }
}
