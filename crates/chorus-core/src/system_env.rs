//! Production Environment implementation using the OS RNG.

use crate::env::Environment;

/// Production environment backed by getrandom.
///
/// # Security
///
/// getrandom provides OS-level cryptographic randomness (e.g. `/dev/urandom`
/// on Linux, `BCryptGenRandom` on Windows), suitable for chain seeds and
/// signing keys.
///
/// # Panics
///
/// Panics if the OS RNG fails. Creating a session without working randomness
/// would produce predictable keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - keys would be predictable");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_seeds_differ() {
        let env = SystemEnv::new();
        assert_ne!(env.random_seed(), env.random_seed());
    }
}
