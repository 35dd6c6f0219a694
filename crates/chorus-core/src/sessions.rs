//! One handle bundling everything builders and ciphers share.

use crate::{
    builder::GroupSessionBuilder, cipher::GroupCipher, config::GroupConfig, env::Environment,
    error::GroupError, locks::SenderKeyLocks, name::SenderKeyName, storage::SenderKeyStore,
};

/// Store, environment, policy and lock table for a device's group sessions.
///
/// Every builder and cipher handed out shares one lock table, so operations
/// on the same [`SenderKeyName`] are serialized no matter which handle
/// performs them. By default that is the process-wide table, which also
/// serializes against other sessions over the same store.
#[derive(Clone)]
pub struct GroupSessions<S, E> {
    store: S,
    env: E,
    locks: SenderKeyLocks,
    config: GroupConfig,
}

impl<S: SenderKeyStore, E: Environment> GroupSessions<S, E> {
    /// Sessions with the default policy and the process-wide lock table.
    pub fn new(store: S, env: E) -> Self {
        Self { store, env, locks: SenderKeyLocks::global(), config: GroupConfig::default() }
    }

    /// Sessions with a custom policy and the process-wide lock table.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the policy fails validation.
    pub fn with_config(store: S, env: E, config: GroupConfig) -> Result<Self, GroupError> {
        config.validate()?;
        Ok(Self { store, env, locks: SenderKeyLocks::global(), config })
    }

    /// Replace the lock table.
    ///
    /// Every handle touching the same store must use the same table, or
    /// operations on one [`SenderKeyName`] can interleave and reuse a
    /// message key. Only isolate sessions whose stores are disjoint.
    #[must_use]
    pub fn with_locks(mut self, locks: SenderKeyLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Builder for creating and processing distribution messages.
    pub fn builder(&self) -> GroupSessionBuilder<S, E> {
        GroupSessionBuilder::from_parts(
            self.store.clone(),
            self.env.clone(),
            self.locks.clone(),
            self.config,
        )
    }

    /// Cipher for the ratchet named `name`.
    pub fn cipher(&self, name: SenderKeyName) -> GroupCipher<S> {
        GroupCipher::from_parts(self.store.clone(), name, self.locks.clone(), self.config)
    }

    /// Forget every epoch of `name`, e.g. after the sender left the group.
    ///
    /// # Errors
    ///
    /// `Storage` if the record cannot be removed.
    pub fn remove(&self, name: &SenderKeyName) -> Result<(), GroupError> {
        let _guard = self.locks.lock(name);
        self.store.remove_sender_key(name)?;
        tracing::debug!(%name, "removed sender key record");
        Ok(())
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active policy.
    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Lock table shared by every handle from these sessions.
    pub fn locks(&self) -> &SenderKeyLocks {
        &self.locks
    }
}
