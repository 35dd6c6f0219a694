//! Tunable ratchet policy.

use serde::{Deserialize, Serialize};

use crate::error::GroupError;

/// Default bound on how far ahead of the chain a message may claim to be.
pub const DEFAULT_MAX_FORWARD_JUMP: u32 = 2000;

/// Default number of skipped message keys cached per epoch.
pub const DEFAULT_MAX_MESSAGE_KEYS: usize = 2000;

/// Default number of epochs kept per sender.
pub const DEFAULT_MAX_STATES: usize = 5;

/// Limits applied by the session builder and group cipher.
///
/// The defaults interoperate with existing deployments. Tightening them is
/// always safe for memory; loosening `max_forward_jump` lets a malicious
/// sender force more key derivations per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Largest accepted gap between a message's iteration and the chain
    /// position. A gap of exactly this value is accepted.
    pub max_forward_jump: u32,

    /// Skipped message keys kept per epoch; the lowest iteration is evicted
    /// first.
    pub max_message_keys: usize,

    /// Epochs kept per record; the oldest is evicted first.
    pub max_states: usize,
}

impl GroupConfig {
    /// Reject limits that would make the ratchet unusable.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if any limit is zero.
    pub fn validate(&self) -> Result<(), GroupError> {
        if self.max_forward_jump == 0 {
            return Err(GroupError::InvalidConfig("max_forward_jump must be non-zero"));
        }

        if self.max_message_keys == 0 {
            return Err(GroupError::InvalidConfig("max_message_keys must be non-zero"));
        }

        if self.max_states == 0 {
            return Err(GroupError::InvalidConfig("max_states must be non-zero"));
        }

        Ok(())
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_forward_jump: DEFAULT_MAX_FORWARD_JUMP,
            max_message_keys: DEFAULT_MAX_MESSAGE_KEYS,
            max_states: DEFAULT_MAX_STATES,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GroupConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_limits_rejected() {
        let config = GroupConfig { max_forward_jump: 0, ..GroupConfig::default() };
        assert!(matches!(config.validate(), Err(GroupError::InvalidConfig(_))));

        let config = GroupConfig { max_message_keys: 0, ..GroupConfig::default() };
        assert!(matches!(config.validate(), Err(GroupError::InvalidConfig(_))));

        let config = GroupConfig { max_states: 0, ..GroupConfig::default() };
        assert!(matches!(config.validate(), Err(GroupError::InvalidConfig(_))));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let partial = BTreeMap::from([("max_states", 3u32)]);

        let mut bytes = Vec::new();
        ciborium::into_writer(&partial, &mut bytes).unwrap();
        let config: GroupConfig = ciborium::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(config.max_states, 3);
        assert_eq!(config.max_forward_jump, DEFAULT_MAX_FORWARD_JUMP);
        assert_eq!(config.max_message_keys, DEFAULT_MAX_MESSAGE_KEYS);
    }
}
