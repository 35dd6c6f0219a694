//! Error types for fingerprint comparison.

use thiserror::Error;

/// Errors while comparing a scanned fingerprint.
///
/// Either way the result must be shown as "could not verify", never as a
/// match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Scanned payload uses a different fingerprint version
    #[error("fingerprint version mismatch: scanned {theirs}, expected {ours}")]
    VersionMismatch {
        /// Version found in the scanned payload
        theirs: u32,
        /// Version this implementation produces
        ours: u32,
    },

    /// Scanned payload is not a fingerprint
    #[error("fingerprint parsing failed: {0}")]
    Parsing(String),
}

impl From<chorus_proto::ProtocolError> for FingerprintError {
    fn from(err: chorus_proto::ProtocolError) -> Self {
        Self::Parsing(err.to_string())
    }
}
