//! Group encryption and decryption for one sender's ratchet.
//!
//! # Decrypt: resolving the message key
//!
//! ```text
//! chain position c, message iteration i
//!
//! i < c            take cached key i (gone → duplicate)
//! i - c > bound    reject, too far ahead
//! otherwise        cache keys c..i, use key i, chain = i + 1
//! ```
//!
//! Every operation mutates a copy of the loaded record and stores it only
//! after the operation succeeded, so a failure anywhere leaves the
//! persisted state as it was.

use std::{convert::Infallible, fmt};

use chorus_crypto::{SenderMessageKey, decrypt_message, encrypt_message};
use chorus_proto::{SenderKeyMessage, UnsignedSenderKeyMessage};

use crate::{
    config::GroupConfig,
    error::GroupError,
    locks::SenderKeyLocks,
    name::SenderKeyName,
    state::{EpochSigningKey, SenderKeyState},
    storage::SenderKeyStore,
};

/// Encrypts and decrypts messages of one [`SenderKeyName`].
///
/// Holds no key material itself: every call loads the record, advances it,
/// and stores it before returning.
#[derive(Clone)]
pub struct GroupCipher<S> {
    store: S,
    name: SenderKeyName,
    pub(crate) locks: SenderKeyLocks,
    config: GroupConfig,
}

impl<S: SenderKeyStore> GroupCipher<S> {
    /// Cipher with the default policy and the process-wide lock table.
    pub fn new(store: S, name: SenderKeyName) -> Self {
        Self::from_parts(store, name, SenderKeyLocks::global(), GroupConfig::default())
    }

    /// Cipher sharing an explicit lock table and a validated policy.
    pub(crate) fn from_parts(
        store: S,
        name: SenderKeyName,
        locks: SenderKeyLocks,
        config: GroupConfig,
    ) -> Self {
        Self { store, name, locks, config }
    }

    /// Ratchet this cipher operates on.
    pub fn name(&self) -> &SenderKeyName {
        &self.name
    }

    /// Encrypt `plaintext` with the newest epoch and advance its chain.
    ///
    /// Padding the plaintext to hide its length is the caller's concern.
    /// The advanced chain is persisted before the ciphertext is returned, so
    /// the stored state can no longer derive the key just used.
    ///
    /// # Errors
    ///
    /// - `NoSession` if no epoch exists
    /// - `NotOriginator` if the newest epoch was received, not created here
    /// - `InvalidMessage` if the chain iteration is exhausted
    /// - `Storage` if the record cannot be loaded or stored
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, GroupError> {
        let _guard = self.locks.lock(&self.name);

        let record = self.store.load_sender_key(&self.name)?;
        let state = record.newest().ok_or(GroupError::NoSession)?;

        let EpochSigningKey::Originated(signing_key) = state.signing_key() else {
            return Err(GroupError::NotOriginator { key_id: state.key_id() });
        };

        let message_key = state.chain_key().message_key();
        let ciphertext = encrypt_message(plaintext, &message_key);

        let unsigned =
            UnsignedSenderKeyMessage::new(state.key_id(), message_key.iteration(), ciphertext);
        let signature = signing_key.sign(unsigned.signed_bytes());
        let message = unsigned.seal(signature);

        let mut updated = state.clone();
        updated.set_chain_key(state.chain_key().next()?);

        tracing::trace!(
            name = %self.name,
            key_id = updated.key_id(),
            iteration = message_key.iteration(),
            "encrypted group message"
        );

        let record = record.with_replaced_state(updated);
        self.store.store_sender_key(&self.name, &record)?;

        Ok(message.into_bytes())
    }

    /// Verify and decrypt a serialized sender-key message.
    ///
    /// # Errors
    ///
    /// - `InvalidMessage` for malformed framing, a bad signature, bad
    ///   padding or an iteration too far ahead
    /// - `LegacyMessage` for an older protocol version
    /// - `NoSession` if no epoch matches the message's key id
    /// - `DuplicateMessage` if the iteration was already consumed
    /// - `Storage` if the record cannot be loaded or stored
    pub fn decrypt(&self, bytes: &[u8]) -> Result<Vec<u8>, GroupError> {
        self.decrypt_with_callback(bytes, |_| Ok::<(), Infallible>(()))
    }

    /// Decrypt, then hand the plaintext to `callback` before persisting.
    ///
    /// The advanced ratchet is stored only if the callback succeeds. A
    /// caller can durably record the plaintext first, so a crash between
    /// the two never loses a message whose key is already gone.
    ///
    /// # Errors
    ///
    /// As [`decrypt`](Self::decrypt), plus `Callback` if the callback
    /// fails. The record is left unchanged in every error case.
    pub fn decrypt_with_callback<F, CallbackError>(
        &self,
        bytes: &[u8],
        callback: F,
    ) -> Result<Vec<u8>, GroupError>
    where
        F: FnOnce(&[u8]) -> Result<(), CallbackError>,
        CallbackError: fmt::Display,
    {
        let message = SenderKeyMessage::parse(bytes).map_err(|err| {
            let err = GroupError::from(err);
            tracing::warn!(name = %self.name, error = %err, "rejected malformed group message");
            err
        })?;

        let _guard = self.locks.lock(&self.name);

        let record = self.store.load_sender_key(&self.name)?;
        let Some(state) = record.state(message.key_id()) else {
            tracing::debug!(name = %self.name, key_id = message.key_id(), "no session for key id");
            return Err(GroupError::NoSession);
        };

        if state.verifying_key().verify(message.signed_bytes(), message.signature()).is_err() {
            tracing::warn!(
                name = %self.name,
                key_id = message.key_id(),
                iteration = message.iteration(),
                "group message signature verification failed"
            );
            return Err(GroupError::InvalidMessage("signature verification failed".to_string()));
        }

        let mut state = state.clone();
        let message_key = self.message_key_for(&mut state, message.iteration())?;

        let plaintext = decrypt_message(message.ciphertext(), &message_key).map_err(|err| {
            tracing::warn!(
                name = %self.name,
                key_id = message.key_id(),
                iteration = message.iteration(),
                error = %err,
                "group message decryption failed"
            );
            GroupError::from(err)
        })?;

        callback(&plaintext).map_err(|err| GroupError::Callback(err.to_string()))?;

        let record = record.with_replaced_state(state);
        self.store.store_sender_key(&self.name, &record)?;

        Ok(plaintext)
    }

    /// Message key for `iteration`, advancing `state` as needed.
    fn message_key_for(
        &self,
        state: &mut SenderKeyState,
        iteration: u32,
    ) -> Result<SenderMessageKey, GroupError> {
        let key_id = state.key_id();
        let current = state.chain_key().iteration();

        if iteration < current {
            return match state.remove_message_key(iteration) {
                Some(message_key) => {
                    tracing::trace!(name = %self.name, key_id, iteration, "served skipped key");
                    Ok(message_key)
                },
                None => {
                    tracing::debug!(name = %self.name, key_id, iteration, "duplicate group message");
                    Err(GroupError::DuplicateMessage { key_id, iteration })
                },
            };
        }

        let jump = iteration - current;
        if jump > self.config.max_forward_jump {
            tracing::warn!(
                name = %self.name,
                key_id,
                iteration,
                current,
                "group message too far into the future"
            );
            return Err(GroupError::InvalidMessage(format!(
                "iteration {iteration} is {jump} ahead of chain position {current}"
            )));
        }

        let mut chain_key = state.chain_key().clone();
        while chain_key.iteration() < iteration {
            state.add_message_key(chain_key.message_key(), self.config.max_message_keys);
            chain_key = chain_key.next()?;
        }

        if jump > 0 {
            tracing::trace!(name = %self.name, key_id, from = current, to = iteration, "ratcheted forward");
        }

        let message_key = chain_key.message_key();
        state.set_chain_key(chain_key.next()?);

        Ok(message_key)
    }
}
