//! Message key expansion using HKDF

use hkdf::Hkdf;
use sha2::Sha256;

/// Info label for message key expansion
const MESSAGE_KEY_INFO: &[u8] = b"WhisperGroup";

/// Length of the AES-CBC initialization vector.
pub const IV_LENGTH: usize = 16;

/// Length of the AES-256 key.
pub const CIPHER_KEY_LENGTH: usize = 32;

/// Expand a message key seed into an IV and an AES-256 key.
///
/// HKDF-SHA256 with no salt produces `IV_LENGTH + CIPHER_KEY_LENGTH` bytes,
/// split as `iv ‖ cipher_key`.
///
/// # Security
///
/// - Deterministic: the same seed always yields the same IV and key
/// - The IV is never reused because each seed is used for one message
pub(crate) fn expand_message_key(seed: &[u8; 32]) -> ([u8; IV_LENGTH], [u8; CIPHER_KEY_LENGTH]) {
    let hkdf = Hkdf::<Sha256>::new(None, seed);

    let mut okm = [0u8; IV_LENGTH + CIPHER_KEY_LENGTH];
    let Ok(()) = hkdf.expand(MESSAGE_KEY_INFO, &mut okm) else {
        unreachable!("48 bytes is a valid HKDF-SHA256 output length");
    };

    let mut iv = [0u8; IV_LENGTH];
    let mut cipher_key = [0u8; CIPHER_KEY_LENGTH];
    iv.copy_from_slice(&okm[..IV_LENGTH]);
    cipher_key.copy_from_slice(&okm[IV_LENGTH..]);

    zeroize::Zeroize::zeroize(&mut okm);

    (iv, cipher_key)
}
