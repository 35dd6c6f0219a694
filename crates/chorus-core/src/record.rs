//! Bounded list of a sender's epochs.

use serde::{Deserialize, Serialize};

use crate::state::SenderKeyState;

/// Every epoch known for one [`SenderKeyName`](crate::SenderKeyName),
/// newest first.
///
/// Several epochs coexist so that messages from an older epoch still in
/// flight after a rotation can be decrypted. Updates consume the record and
/// return the new one; the caller persists the result as a whole.
///
/// # Invariants
///
/// - Key ids are unique within a record
/// - Index 0 is the most recently added epoch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderKeyRecord {
    states: Vec<SenderKeyState>,
}

impl SenderKeyRecord {
    /// Empty record, as returned for a name never seen before.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no epoch has been created or processed.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of epochs held.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Most recently added epoch, used for sending.
    pub fn newest(&self) -> Option<&SenderKeyState> {
        self.states.first()
    }

    /// Epoch with the given key id.
    pub fn state(&self, key_id: u32) -> Option<&SenderKeyState> {
        self.states.iter().find(|state| state.key_id() == key_id)
    }

    /// Key ids, newest first.
    pub fn key_ids(&self) -> Vec<u32> {
        self.states.iter().map(SenderKeyState::key_id).collect()
    }

    /// Add an epoch at the front, evicting the oldest beyond `max_states`.
    ///
    /// If an epoch with the same key id and signing key is already held, it
    /// is moved to the front unchanged, so a redelivered distribution
    /// message cannot rewind the chain. An epoch with the same key id but a
    /// different signing key is dropped.
    #[must_use]
    pub fn with_state(mut self, state: SenderKeyState, max_states: usize) -> Self {
        let existing = self.states.iter().position(|held| {
            held.key_id() == state.key_id() && held.verifying_key() == state.verifying_key()
        });

        let state = match existing {
            Some(index) => self.states.remove(index),
            None => state,
        };

        self.states.retain(|held| held.key_id() != state.key_id());
        self.states.insert(0, state);
        self.states.truncate(max_states);

        self
    }

    /// Replace the epoch carrying the same key id, keeping its position.
    ///
    /// A state whose key id is not held is ignored.
    #[must_use]
    pub fn with_replaced_state(mut self, state: SenderKeyState) -> Self {
        if let Some(held) = self.states.iter_mut().find(|held| held.key_id() == state.key_id()) {
            *held = state;
        }

        self
    }
}
