//! Version byte shared by sender-key messages.
//!
//! The byte packs two nibbles: the message version (high) and the current
//! version of the sender (low). Only the high nibble is checked on receipt.

use crate::errors::{ProtocolError, Result};

/// Sender-key message version produced by this implementation.
pub const CURRENT_VERSION: u8 = 3;

/// Version byte prepended to every sender-key message.
pub(crate) const fn version_byte() -> u8 {
    (CURRENT_VERSION << 4) | CURRENT_VERSION
}

/// Validate the high nibble of a received version byte.
pub(crate) fn check_version(byte: u8) -> Result<()> {
    let version = byte >> 4;

    if version < CURRENT_VERSION {
        return Err(ProtocolError::LegacyVersion(version));
    }

    if version > CURRENT_VERSION {
        return Err(ProtocolError::UnknownVersion(version));
    }

    Ok(())
}
