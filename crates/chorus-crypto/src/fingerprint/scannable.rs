//! QR-code rendering of a fingerprint.

use chorus_proto::CombinedFingerprints;
use subtle::ConstantTimeEq;

use super::FingerprintError;

/// Scannable payload format version.
pub const SCANNABLE_VERSION: u32 = 1;

/// Bytes of each party's hash carried in the QR payload.
const CONTENT_LENGTH: usize = 32;

/// The first 32 bytes of each party's iterated hash, for QR exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannableFingerprint {
    local: [u8; CONTENT_LENGTH],
    remote: [u8; CONTENT_LENGTH],
}

impl ScannableFingerprint {
    /// Truncate each party's iterated hash.
    pub(crate) fn new(local_hash: &[u8; 64], remote_hash: &[u8; 64]) -> Self {
        let mut local = [0u8; CONTENT_LENGTH];
        let mut remote = [0u8; CONTENT_LENGTH];
        local.copy_from_slice(&local_hash[..CONTENT_LENGTH]);
        remote.copy_from_slice(&remote_hash[..CONTENT_LENGTH]);

        Self { local, remote }
    }

    /// Payload to render as a QR code.
    pub fn serialize(&self) -> Vec<u8> {
        CombinedFingerprints::new(SCANNABLE_VERSION, self.local.to_vec(), self.remote.to_vec())
            .serialize()
    }

    /// Compare against a payload scanned from the peer's screen.
    ///
    /// The peer encodes itself as "local", so its local content must equal
    /// our remote content and vice versa. Comparison is constant time.
    ///
    /// # Errors
    ///
    /// - `VersionMismatch` if the payload uses another version, whatever
    ///   else it carries
    /// - `Parsing` if the payload is not a combined fingerprint
    pub fn compare_to(&self, scanned: &[u8]) -> Result<bool, FingerprintError> {
        let version = CombinedFingerprints::version_of(scanned)?;
        if version != SCANNABLE_VERSION {
            return Err(FingerprintError::VersionMismatch { theirs: version, ours: SCANNABLE_VERSION });
        }

        let theirs = CombinedFingerprints::parse(scanned)?;

        let matches = theirs.remote().ct_eq(&self.local) & theirs.local().ct_eq(&self.remote);
        Ok(matches.into())
    }

    /// Our own 32-byte content.
    pub fn local_content(&self) -> &[u8; CONTENT_LENGTH] {
        &self.local
    }

    /// The peer's 32-byte content.
    pub fn remote_content(&self) -> &[u8; CONTENT_LENGTH] {
        &self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (ScannableFingerprint, ScannableFingerprint) {
        let alice = ScannableFingerprint::new(&[0xA1; 64], &[0xB0; 64]);
        let bob = ScannableFingerprint::new(&[0xB0; 64], &[0xA1; 64]);
        (alice, bob)
    }

    #[test]
    fn content_is_truncated_hash() {
        let mut hash = [0u8; 64];
        hash[31] = 1;
        hash[32] = 2;

        let fingerprint = ScannableFingerprint::new(&hash, &[0; 64]);
        assert_eq!(fingerprint.local_content()[31], 1);
        assert_eq!(fingerprint.local_content().len(), 32);
    }

    #[test]
    fn cross_comparison_matches() {
        let (alice, bob) = pair();

        assert_eq!(alice.compare_to(&bob.serialize()), Ok(true));
        assert_eq!(bob.compare_to(&alice.serialize()), Ok(true));
    }

    #[test]
    fn self_comparison_does_not_match() {
        let (alice, _) = pair();
        assert_eq!(alice.compare_to(&alice.serialize()), Ok(false));
    }

    #[test]
    fn version_mismatch_is_reported() {
        let (alice, bob) = pair();
        let scanned =
            CombinedFingerprints::new(0, bob.local.to_vec(), bob.remote.to_vec()).serialize();

        assert_eq!(
            alice.compare_to(&scanned),
            Err(FingerprintError::VersionMismatch { theirs: 0, ours: SCANNABLE_VERSION })
        );
    }

    #[test]
    fn newer_version_without_fingerprints_is_a_mismatch() {
        let (alice, _) = pair();

        assert_eq!(
            alice.compare_to(&[0x08, 0x02]),
            Err(FingerprintError::VersionMismatch { theirs: 2, ours: SCANNABLE_VERSION })
        );
    }

    #[test]
    fn current_version_without_fingerprints_is_a_parsing_error() {
        let (alice, _) = pair();
        assert!(matches!(alice.compare_to(&[0x08, 0x01]), Err(FingerprintError::Parsing(_))));
    }

    #[test]
    fn short_content_never_matches() {
        let (alice, bob) = pair();
        let scanned =
            CombinedFingerprints::new(1, bob.local[..31].to_vec(), bob.remote.to_vec()).serialize();

        assert_eq!(alice.compare_to(&scanned), Ok(false));
    }

    #[test]
    fn garbage_is_a_parsing_error() {
        let (alice, _) = pair();
        assert!(matches!(alice.compare_to(&[0xFF, 0xFF]), Err(FingerprintError::Parsing(_))));
    }
}
