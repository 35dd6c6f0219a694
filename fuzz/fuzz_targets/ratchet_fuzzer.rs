//! Fuzz target for the sender chain and message encryption
//!
//! # Strategy
//!
//! - Arbitrary chain seeds and starting iterations (including near u32::MAX)
//! - Random sequences of advance / encrypt / corrupt operations
//!
//! # Invariants
//!
//! - Deriving a message key never advances the chain
//! - Message key derivation is deterministic
//! - Advancing increments the iteration or errors at u32::MAX
//! - Encrypt/decrypt roundtrip succeeds
//! - Corrupted ciphertext never decrypts to the original plaintext

#![no_main]

use arbitrary::Arbitrary;
use chorus_crypto::{SenderChainKey, decrypt_message, encrypt_message};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct ChainScenario {
    seed: [u8; 32],
    start: u32,
    operations: Vec<ChainOperation>,
}

#[derive(Debug, Clone, Arbitrary)]
enum ChainOperation {
    Advance,
    Encrypt { plaintext: Vec<u8> },
    Corrupt { plaintext: Vec<u8>, index: usize, flip: u8 },
    Truncate { plaintext: Vec<u8>, keep: usize },
}

fuzz_target!(|scenario: ChainScenario| {
    let mut chain = SenderChainKey::new(scenario.start, scenario.seed);

    for op in scenario.operations.into_iter().take(256) {
        match op {
            ChainOperation::Advance => match chain.next() {
                Ok(next) => {
                    assert_eq!(next.iteration(), chain.iteration() + 1);
                    assert_ne!(next.seed(), chain.seed());
                    chain = next;
                },
                Err(_) => assert_eq!(chain.iteration(), u32::MAX),
            },

            ChainOperation::Encrypt { plaintext } => {
                let key = chain.message_key();
                let again = chain.message_key();
                assert_eq!(key.iv(), again.iv());
                assert_eq!(key.cipher_key(), again.cipher_key());
                assert_eq!(key.iteration(), chain.iteration());

                let ciphertext = encrypt_message(&plaintext, &key);
                assert_eq!(ciphertext.len() % 16, 0);
                assert!(ciphertext.len() > plaintext.len());
                assert_eq!(decrypt_message(&ciphertext, &again).unwrap(), plaintext);
            },

            ChainOperation::Corrupt { plaintext, index, flip } => {
                if flip == 0 {
                    continue;
                }

                let key = chain.message_key();
                let mut ciphertext = encrypt_message(&plaintext, &key);
                let index = index % ciphertext.len();
                ciphertext[index] ^= flip;

                if let Ok(decrypted) = decrypt_message(&ciphertext, &key) {
                    assert_ne!(decrypted, plaintext);
                }
            },

            ChainOperation::Truncate { plaintext, keep } => {
                let key = chain.message_key();
                let ciphertext = encrypt_message(&plaintext, &key);
                let keep = keep % ciphertext.len();

                // Never panics on unaligned or empty input
                let _ = decrypt_message(&ciphertext[..keep], &key);
            },
        }
    }
});
