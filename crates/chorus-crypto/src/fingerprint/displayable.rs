//! Numeric rendering of a fingerprint.

use std::fmt;

/// Number of 5-digit groups per party.
const CHUNKS: usize = 6;

/// Hash bytes consumed per group.
const CHUNK_BYTES: usize = 5;

/// Two 30-digit strings, one per party, ordered so both parties render the
/// same 60 digits regardless of who is "local".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayableFingerprint {
    local: String,
    remote: String,
}

impl DisplayableFingerprint {
    /// Render digits from each party's iterated hash.
    pub(crate) fn new(local_hash: &[u8; 64], remote_hash: &[u8; 64]) -> Self {
        Self { local: digits(local_hash), remote: digits(remote_hash) }
    }

    /// The 60-digit string both parties compare: the smaller 30-digit half
    /// first.
    pub fn display_text(&self) -> String {
        if self.local <= self.remote {
            format!("{}{}", self.local, self.remote)
        } else {
            format!("{}{}", self.remote, self.local)
        }
    }

    /// This party's 30 digits.
    pub fn local_digits(&self) -> &str {
        &self.local
    }

    /// The peer's 30 digits.
    pub fn remote_digits(&self) -> &str {
        &self.remote
    }
}

impl fmt::Display for DisplayableFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Six big-endian 40-bit chunks, each reduced mod 100000 and zero-padded.
fn digits(hash: &[u8; 64]) -> String {
    hash.chunks_exact(CHUNK_BYTES)
        .take(CHUNKS)
        .map(|chunk| {
            let value = chunk.iter().fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
            format!("{:05}", value % 100_000)
        })
        .collect()
}
