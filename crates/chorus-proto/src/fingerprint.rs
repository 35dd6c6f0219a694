//! Scannable fingerprint payload.
//!
//! The structure a QR code carries when two parties verify each other's
//! identity keys. Version checks and comparison semantics belong to the
//! caller; this type only frames the bytes.

use prost::Message;

use crate::errors::{ProtocolError, Result};

#[derive(Clone, PartialEq, Message)]
struct LogicalFingerprintProto {
    #[prost(bytes = "vec", optional, tag = "1")]
    content: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
struct CombinedFingerprintsProto {
    #[prost(uint32, optional, tag = "1")]
    version: Option<u32>,
    #[prost(message, optional, tag = "2")]
    local_fingerprint: Option<LogicalFingerprintProto>,
    #[prost(message, optional, tag = "3")]
    remote_fingerprint: Option<LogicalFingerprintProto>,
}

/// Versioned pair of fingerprint contents, as seen by the party that encoded
/// it: `local` is their own, `remote` is the peer's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedFingerprints {
    version: u32,
    local: Vec<u8>,
    remote: Vec<u8>,
}

impl CombinedFingerprints {
    /// Combine two fingerprint contents under a version.
    pub fn new(version: u32, local: Vec<u8>, remote: Vec<u8>) -> Self {
        Self { version, local, remote }
    }

    /// Read only the format version of a scanned payload.
    ///
    /// Payloads from other versions may lay out their fingerprints
    /// differently, so the version must be checked before [`Self::parse`].
    ///
    /// # Errors
    ///
    /// `Decode` for malformed protobuf, `MissingField` if the version is
    /// absent.
    pub fn version_of(bytes: &[u8]) -> Result<u32> {
        CombinedFingerprintsProto::decode(bytes)?
            .version
            .ok_or(ProtocolError::MissingField("version"))
    }

    /// Parse a scanned payload.
    ///
    /// # Errors
    ///
    /// `Decode` for malformed protobuf, `MissingField` if the version or
    /// either fingerprint is absent.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let body = CombinedFingerprintsProto::decode(bytes)?;

        let version = body.version.ok_or(ProtocolError::MissingField("version"))?;
        let local = body
            .local_fingerprint
            .and_then(|fingerprint| fingerprint.content)
            .ok_or(ProtocolError::MissingField("local_fingerprint"))?;
        let remote = body
            .remote_fingerprint
            .and_then(|fingerprint| fingerprint.content)
            .ok_or(ProtocolError::MissingField("remote_fingerprint"))?;

        Ok(Self { version, local, remote })
    }

    /// Encode for a QR code.
    pub fn serialize(&self) -> Vec<u8> {
        CombinedFingerprintsProto {
            version: Some(self.version),
            local_fingerprint: Some(LogicalFingerprintProto { content: Some(self.local.clone()) }),
            remote_fingerprint: Some(LogicalFingerprintProto {
                content: Some(self.remote.clone()),
            }),
        }
        .encode_to_vec()
    }

    /// Format version of the payload.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Fingerprint content of the encoding party.
    pub fn local(&self) -> &[u8] {
        &self.local
    }

    /// Fingerprint content of the encoding party's peer.
    pub fn remote(&self) -> &[u8] {
        &self.remote
    }
}
