//! Identity fingerprints for out-of-band verification
//!
//! Two parties compare either a 60-digit number read aloud
//! ([`DisplayableFingerprint`]) or a QR code scanned by the other device
//! ([`ScannableFingerprint`]). Both are derived from the same per-party
//! iterated hash, so either method detects a substituted identity key.
//!
//! Everything here is a pure function of the inputs: no state, no locking.

mod displayable;
mod error;
mod generator;
mod scannable;

pub use displayable::DisplayableFingerprint;
pub use error::FingerprintError;
pub use generator::{DEFAULT_ITERATIONS, FINGERPRINT_VERSION, NumericFingerprintGenerator};
pub use scannable::{SCANNABLE_VERSION, ScannableFingerprint};

/// Both renderings of one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Digits for reading aloud.
    pub displayable: DisplayableFingerprint,
    /// Payload for a QR code.
    pub scannable: ScannableFingerprint,
}
