//! Distribution message: bootstrap for a sender's ratchet epoch.
//!
//! Carries the chain key seed and public signing key a receiver needs to
//! follow one sender's ratchet. The message is unsigned; it relies on the
//! pairwise channel it travels over for authentication.

use prost::Message;

use crate::{
    errors::{ProtocolError, Result},
    version::{check_version, version_byte},
};

/// Length of the chain key seed.
pub const CHAIN_KEY_LENGTH: usize = 32;

/// Length of the Ed25519 public signing key.
pub const SIGNING_KEY_LENGTH: usize = 32;

#[derive(Clone, PartialEq, Message)]
struct DistributionProto {
    #[prost(uint32, optional, tag = "1")]
    id: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    iteration: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    chain_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    signing_key: Option<Vec<u8>>,
}

/// Sender-key distribution message.
///
/// Layout: `[version: 1 byte] [protobuf { id, iteration, chain_key,
/// signing_key }]`.
///
/// # Invariants
///
/// - `chain_key` and `signing_key` are exactly 32 bytes (enforced by the
///   array types and checked by [`parse`](Self::parse))
/// - `serialize()` returns the bytes this value was built from or parsed from
#[derive(Clone, PartialEq, Eq)]
pub struct SenderKeyDistributionMessage {
    key_id: u32,
    iteration: u32,
    chain_key: [u8; CHAIN_KEY_LENGTH],
    signing_key: [u8; SIGNING_KEY_LENGTH],
    serialized: Vec<u8>,
}

impl SenderKeyDistributionMessage {
    /// Build and encode a distribution message.
    pub fn new(
        key_id: u32,
        iteration: u32,
        chain_key: [u8; CHAIN_KEY_LENGTH],
        signing_key: [u8; SIGNING_KEY_LENGTH],
    ) -> Self {
        let body = DistributionProto {
            id: Some(key_id),
            iteration: Some(iteration),
            chain_key: Some(chain_key.to_vec()),
            signing_key: Some(signing_key.to_vec()),
        };

        let mut serialized = Vec::with_capacity(1 + body.encoded_len());
        serialized.push(version_byte());
        serialized.extend_from_slice(&body.encode_to_vec());

        Self { key_id, iteration, chain_key, signing_key, serialized }
    }

    /// Parse a serialized distribution message.
    ///
    /// # Errors
    ///
    /// - `Truncated` for empty input
    /// - `LegacyVersion` / `UnknownVersion` for a foreign version byte
    /// - `Decode` / `MissingField` / `InvalidLength` for a malformed body
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some((&version, body)) = bytes.split_first() else {
            return Err(ProtocolError::Truncated { actual: 0, minimum: 1 });
        };

        check_version(version)?;

        let body = DistributionProto::decode(body)?;

        let key_id = body.id.ok_or(ProtocolError::MissingField("id"))?;
        let iteration = body.iteration.ok_or(ProtocolError::MissingField("iteration"))?;
        let chain_key = fixed::<CHAIN_KEY_LENGTH>(body.chain_key, "chain_key")?;
        let signing_key = fixed::<SIGNING_KEY_LENGTH>(body.signing_key, "signing_key")?;

        Ok(Self { key_id, iteration, chain_key, signing_key, serialized: bytes.to_vec() })
    }

    /// Epoch identifier.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Iteration the chain key seed belongs to.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Chain key seed at [`iteration`](Self::iteration).
    pub fn chain_key(&self) -> &[u8; CHAIN_KEY_LENGTH] {
        &self.chain_key
    }

    /// Public half of the epoch's signing key.
    pub fn signing_key(&self) -> &[u8; SIGNING_KEY_LENGTH] {
        &self.signing_key
    }

    /// Wire encoding.
    pub fn serialize(&self) -> &[u8] {
        &self.serialized
    }
}

// Chain key seeds are secret; keep them out of logs.
impl std::fmt::Debug for SenderKeyDistributionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderKeyDistributionMessage")
            .field("key_id", &self.key_id)
            .field("iteration", &self.iteration)
            .field("signing_key", &self.signing_key)
            .finish_non_exhaustive()
    }
}

fn fixed<const N: usize>(value: Option<Vec<u8>>, field: &'static str) -> Result<[u8; N]> {
    let value = value.ok_or(ProtocolError::MissingField(field))?;

    <[u8; N]>::try_from(value.as_slice()).map_err(|_| ProtocolError::InvalidLength {
        field,
        expected: N,
        actual: value.len(),
    })
}
