//! Fuzz target for wire-format parsing
//!
//! Feeds arbitrary bytes to every parser to find:
//! - Parser crashes or panics
//! - Length checks that can be bypassed
//! - Inputs that parse but do not serialize back to themselves
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use chorus_proto::{CombinedFingerprints, SenderKeyDistributionMessage, SenderKeyMessage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = SenderKeyMessage::parse(data) {
        // INVARIANT: parsed messages keep their exact bytes (they are signed)
        assert_eq!(message.serialize(), data);
        assert_eq!(message.signed_bytes().len() + 64, data.len());
    }

    if let Ok(distribution) = SenderKeyDistributionMessage::parse(data) {
        assert_eq!(distribution.serialize(), data);
        assert_eq!(distribution.chain_key().len(), 32);
    }

    let _ = CombinedFingerprints::parse(data);
});
