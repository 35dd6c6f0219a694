//! Error types for wire-format parsing.

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while parsing serialized protocol messages.
///
/// Every variant describes malformed input. None of them are transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Input shorter than the fixed framing requires
    #[error("message too short: got {actual} bytes, need at least {minimum}")]
    Truncated {
        /// Bytes received
        actual: usize,
        /// Minimum bytes required by the framing
        minimum: usize,
    },

    /// Message uses a version older than this implementation supports
    #[error("legacy message version: {0}")]
    LegacyVersion(u8),

    /// Message uses a version newer than this implementation knows about
    #[error("unknown message version: {0}")]
    UnknownVersion(u8),

    /// Required protobuf field was absent
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Fixed-size field had the wrong length
    #[error("invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Field name
        field: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Length found on the wire
        actual: usize,
    },

    /// Protobuf body could not be decoded
    #[error("protobuf decode error: {0}")]
    Decode(String),
}

impl From<prost::DecodeError> for ProtocolError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}
