//! Message encryption using AES-256-CBC with PKCS#7 padding
//!
//! Integrity is not provided here: every ciphertext is signed by the sender
//! and the signature is checked before decryption is attempted.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use super::{chain::SenderMessageKey, error::SenderKeyError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size (16 bytes)
const BLOCK_SIZE: usize = 16;

/// Encrypt a plaintext with a message key.
///
/// The ciphertext is always a non-zero multiple of 16 bytes: PKCS#7 adds a
/// full block of padding when the plaintext is already block aligned.
pub fn encrypt_message(plaintext: &[u8], message_key: &SenderMessageKey) -> Vec<u8> {
    Aes256CbcEnc::new(message_key.cipher_key().into(), message_key.iv().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a ciphertext with a message key.
///
/// # Errors
///
/// - `DecryptionFailed`: ciphertext is empty, not block aligned, or its
///   padding is invalid (wrong key or corruption)
pub fn decrypt_message(
    ciphertext: &[u8],
    message_key: &SenderMessageKey,
) -> Result<Vec<u8>, SenderKeyError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(SenderKeyError::DecryptionFailed {
            reason: format!("ciphertext length {} is not a positive multiple of 16", ciphertext.len()),
        });
    }

    Aes256CbcDec::new(message_key.cipher_key().into(), message_key.iv().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| SenderKeyError::DecryptionFailed { reason: "invalid padding".to_string() })
}

#[cfg(test)]
mod tests {
    use super::{super::chain::SenderChainKey, *};

    fn test_message_key(iteration: u32) -> SenderMessageKey {
        let mut seed = [0u8; 32];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = (i + iteration as usize) as u8;
        }
        SenderChainKey::new(iteration, seed).message_key()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let message_key = test_message_key(0);
        let plaintext = b"Hello, World!";

        let ciphertext = encrypt_message(plaintext, &message_key);
        let decrypted = decrypt_message(&ciphertext, &message_key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn empty_plaintext_gets_full_padding_block() {
        let message_key = test_message_key(0);

        let ciphertext = encrypt_message(b"", &message_key);
        assert_eq!(ciphertext.len(), BLOCK_SIZE);

        assert_eq!(decrypt_message(&ciphertext, &message_key).unwrap(), b"");
    }

    #[test]
    fn block_aligned_plaintext_gains_a_block() {
        let message_key = test_message_key(1);
        let plaintext = [0x42u8; 32];

        let ciphertext = encrypt_message(&plaintext, &message_key);
        assert_eq!(ciphertext.len(), 48);
        assert_eq!(decrypt_message(&ciphertext, &message_key).unwrap(), plaintext);
    }

    #[test]
    fn encrypt_decrypt_large_message() {
        let message_key = test_message_key(0);
        let plaintext = vec![0x42u8; 64 * 1024];

        let ciphertext = encrypt_message(&plaintext, &message_key);
        assert_eq!(decrypt_message(&ciphertext, &message_key).unwrap(), plaintext);
    }

    #[test]
    fn encryption_is_deterministic_per_key() {
        let message_key = test_message_key(5);

        assert_eq!(encrypt_message(b"same", &message_key), encrypt_message(b"same", &message_key));
    }

    #[test]
    fn different_keys_produce_different_ciphertexts() {
        let a = encrypt_message(b"test", &test_message_key(0));
        let b = encrypt_message(b"test", &test_message_key(1));

        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_or_garbles() {
        let plaintext = b"secret message";
        let ciphertext = encrypt_message(plaintext, &test_message_key(0));

        // CBC has no authentication tag: a wrong key usually breaks the
        // padding, and never yields the original plaintext.
        match decrypt_message(&ciphertext, &test_message_key(1)) {
            Ok(garbled) => assert_ne!(garbled, plaintext),
            Err(err) => assert!(matches!(err, SenderKeyError::DecryptionFailed { .. })),
        }
    }

    #[test]
    fn unaligned_ciphertext_is_rejected() {
        let message_key = test_message_key(0);

        let result = decrypt_message(&[0u8; 15], &message_key);
        assert!(matches!(
            result,
            Err(SenderKeyError::DecryptionFailed { reason }) if reason.contains("multiple of 16")
        ));

        assert!(decrypt_message(&[], &message_key).is_err());
    }

    #[test]
    fn corrupted_padding_is_rejected() {
        let message_key = test_message_key(0);
        let mut ciphertext = encrypt_message(b"0123456789abcdef", &message_key);

        // The last block is pure padding; flipping a bit in the previous block
        // flips the same bit in the decrypted padding byte.
        let index = ciphertext.len() - BLOCK_SIZE - 1;
        ciphertext[index] ^= 0x01;

        assert_eq!(
            decrypt_message(&ciphertext, &message_key),
            Err(SenderKeyError::DecryptionFailed { reason: "invalid padding".to_string() })
        );
    }
}
