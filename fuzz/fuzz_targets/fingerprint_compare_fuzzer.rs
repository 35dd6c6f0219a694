//! Fuzz target for scannable fingerprint comparison
//!
//! # Invariants
//!
//! - Comparing against arbitrary bytes never panics
//! - Arbitrary bytes only match when they carry exactly the peer's view
//! - The peer's own serialization always matches

#![no_main]

use arbitrary::Arbitrary;
use chorus_crypto::{IdentityKey, NumericFingerprintGenerator};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    local_seed: [u8; 32],
    remote_seed: [u8; 32],
    local_id: Vec<u8>,
    remote_id: Vec<u8>,
    scanned: Vec<u8>,
}

fuzz_target!(|scenario: Scenario| {
    let generator = NumericFingerprintGenerator::new(4);
    let local = IdentityKey::from_private_seed(&scenario.local_seed);
    let remote = IdentityKey::from_private_seed(&scenario.remote_seed);

    let ours = generator.create_for_single(&scenario.local_id, &local, &scenario.remote_id, &remote);
    let theirs =
        generator.create_for_single(&scenario.remote_id, &remote, &scenario.local_id, &local);

    assert_eq!(ours.displayable.display_text(), theirs.displayable.display_text());
    assert_eq!(ours.scannable.compare_to(&theirs.scannable.serialize()), Ok(true));

    if let Ok(true) = ours.scannable.compare_to(&scenario.scanned) {
        let parsed = chorus_proto::CombinedFingerprints::parse(&scenario.scanned).unwrap();
        assert_eq!(parsed.local(), ours.scannable.remote_content());
        assert_eq!(parsed.remote(), ours.scannable.local_content());
    }
});
