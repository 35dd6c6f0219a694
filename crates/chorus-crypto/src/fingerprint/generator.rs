//! Iterated-hash fingerprint generation.

use sha2::{Digest, Sha512};

use super::{DisplayableFingerprint, Fingerprint, ScannableFingerprint};
use crate::signing::IdentityKey;

/// Version prefix mixed into the first hash round.
pub const FINGERPRINT_VERSION: u16 = 0;

/// Hash iterations used unless a deployment chooses otherwise.
///
/// Both parties must use the same count or their fingerprints never agree.
pub const DEFAULT_ITERATIONS: u32 = 5200;

/// Generates fingerprints by iterated SHA-512.
///
/// For each party:
///
/// ```text
/// keys  = concat(sorted(identity_keys))
/// hash  = SHA-512(version ‖ keys ‖ stable_id)
/// repeat iterations times:
///     hash = SHA-512(keys ‖ hash)
/// ```
///
/// The iteration count makes each guess of a colliding key expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFingerprintGenerator {
    iterations: u32,
}

impl NumericFingerprintGenerator {
    /// Generator with an explicit iteration count.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Configured iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Fingerprint for a local and a remote party.
    ///
    /// Identity key slices may be in any order and may hold several keys
    /// per party (one per device); they are canonically sorted first.
    pub fn create_for(
        &self,
        local_stable_id: &[u8],
        local_identity_keys: &[IdentityKey],
        remote_stable_id: &[u8],
        remote_identity_keys: &[IdentityKey],
    ) -> Fingerprint {
        let local = self.hash_party(local_stable_id, local_identity_keys);
        let remote = self.hash_party(remote_stable_id, remote_identity_keys);

        Fingerprint {
            displayable: DisplayableFingerprint::new(&local, &remote),
            scannable: ScannableFingerprint::new(&local, &remote),
        }
    }

    /// Fingerprint for two parties with one identity key each.
    pub fn create_for_single(
        &self,
        local_stable_id: &[u8],
        local_identity_key: &IdentityKey,
        remote_stable_id: &[u8],
        remote_identity_key: &IdentityKey,
    ) -> Fingerprint {
        self.create_for(
            local_stable_id,
            std::slice::from_ref(local_identity_key),
            remote_stable_id,
            std::slice::from_ref(remote_identity_key),
        )
    }

    /// Iterated hash for one party.
    pub fn hash_party(&self, stable_id: &[u8], identity_keys: &[IdentityKey]) -> [u8; 64] {
        let keys = canonical_key_bytes(identity_keys);

        let version = FINGERPRINT_VERSION.to_be_bytes();
        let mut hash = sha512(&[version.as_slice(), keys.as_slice(), stable_id]);

        for _ in 0..self.iterations {
            hash = sha512(&[keys.as_slice(), hash.as_slice()]);
        }

        hash
    }
}

impl Default for NumericFingerprintGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

fn sha512(parts: &[&[u8]]) -> [u8; 64] {
    let mut digest = Sha512::new();
    for part in parts {
        digest.update(part);
    }

    let mut output = [0u8; 64];
    output.copy_from_slice(&digest.finalize());
    output
}

/// Sorted, concatenated serialized keys.
fn canonical_key_bytes(identity_keys: &[IdentityKey]) -> Vec<u8> {
    let mut sorted = identity_keys.to_vec();
    sorted.sort();

    sorted.iter().flat_map(IdentityKey::to_bytes).collect()
}
