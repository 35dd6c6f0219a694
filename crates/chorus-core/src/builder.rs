//! Session setup: creating, rotating and receiving epochs.
//!
//! ```text
//! sender                                   receiver
//! ──────                                   ────────
//! create(name) ──► distribution message ──► process(name, message)
//!                  (pairwise channel)
//! ```
//!
//! Distribution messages are not signed. They must arrive over an already
//! authenticated pairwise channel.

use chorus_crypto::{SenderChainKey, SenderSigningKey};
use chorus_proto::SenderKeyDistributionMessage;
use zeroize::Zeroizing;

use crate::{
    config::GroupConfig,
    env::Environment,
    error::GroupError,
    locks::SenderKeyLocks,
    name::SenderKeyName,
    record::SenderKeyRecord,
    state::SenderKeyState,
    storage::SenderKeyStore,
};

/// Creates and processes sender-key distribution messages.
///
/// Every operation is one atomic read-modify-write of the name's record,
/// serialized against ciphers sharing the same lock table.
#[derive(Clone)]
pub struct GroupSessionBuilder<S, E> {
    store: S,
    env: E,
    pub(crate) locks: SenderKeyLocks,
    config: GroupConfig,
}

impl<S: SenderKeyStore, E: Environment> GroupSessionBuilder<S, E> {
    /// Builder with the default policy and the process-wide lock table.
    pub fn new(store: S, env: E) -> Self {
        Self::from_parts(store, env, SenderKeyLocks::global(), GroupConfig::default())
    }

    /// Builder sharing an explicit lock table and a validated policy.
    pub(crate) fn from_parts(store: S, env: E, locks: SenderKeyLocks, config: GroupConfig) -> Self {
        Self { store, env, locks, config }
    }

    /// Distribution message for this device's current epoch under `name`,
    /// creating the epoch first if none exists.
    ///
    /// Repeated calls return the same epoch; they never rotate keys. The
    /// message describes the current chain position, so members receiving
    /// it later cannot decrypt earlier messages.
    ///
    /// # Errors
    ///
    /// `Storage` if the record cannot be loaded or stored.
    pub fn create(&self, name: &SenderKeyName) -> Result<SenderKeyDistributionMessage, GroupError> {
        let _guard = self.locks.lock(name);

        let record = self.store.load_sender_key(name)?;

        if let Some(state) = record.newest() {
            return Ok(state.distribution_message());
        }

        let state = self.new_epoch(&record);
        let message = state.distribution_message();
        tracing::debug!(%name, key_id = state.key_id(), "created sender key epoch");

        let record = record.with_state(state, self.config.max_states);
        self.store.store_sender_key(name, &record)?;

        Ok(message)
    }

    /// Start a new epoch for `name` and return its distribution message.
    ///
    /// Earlier epochs stay in the record until evicted, so messages still
    /// in flight from them remain decryptable.
    ///
    /// # Errors
    ///
    /// `Storage` if the record cannot be loaded or stored.
    pub fn rotate(&self, name: &SenderKeyName) -> Result<SenderKeyDistributionMessage, GroupError> {
        let _guard = self.locks.lock(name);

        let record = self.store.load_sender_key(name)?;

        let state = self.new_epoch(&record);
        let message = state.distribution_message();
        tracing::debug!(
            %name,
            key_id = state.key_id(),
            previous = ?record.newest().map(SenderKeyState::key_id),
            "rotated sender key epoch"
        );

        let record = record.with_state(state, self.config.max_states);
        self.store.store_sender_key(name, &record)?;

        Ok(message)
    }

    /// Add the epoch described by `message` to `name`'s record.
    ///
    /// The new epoch goes to the front; existing epochs are kept so late
    /// messages from a previous epoch still decrypt. Processing the same
    /// message twice is a no-op and never rewinds the chain.
    ///
    /// # Errors
    ///
    /// - `InvalidMessage` if the signing key is not a valid curve point
    /// - `Storage` if the record cannot be loaded or stored
    pub fn process(
        &self,
        name: &SenderKeyName,
        message: &SenderKeyDistributionMessage,
    ) -> Result<(), GroupError> {
        let state = SenderKeyState::from_distribution(message)?;

        let _guard = self.locks.lock(name);

        let record = self.store.load_sender_key(name)?;

        match record.state(message.key_id()) {
            Some(held) if held.verifying_key() == state.verifying_key() => {
                tracing::debug!(%name, key_id = message.key_id(), "epoch already known");
            },
            Some(_) => {
                tracing::warn!(
                    %name,
                    key_id = message.key_id(),
                    "replacing epoch with a different signing key"
                );
            },
            None => {
                tracing::debug!(
                    %name,
                    key_id = message.key_id(),
                    iteration = message.iteration(),
                    "processed sender key distribution"
                );
            },
        }

        let record = record.with_state(state, self.config.max_states);
        self.store.store_sender_key(name, &record)?;

        Ok(())
    }

    /// Fresh originated epoch whose key id is not already in `record`.
    fn new_epoch(&self, record: &SenderKeyRecord) -> SenderKeyState {
        let key_id = loop {
            let candidate = self.env.random_u32();
            if record.state(candidate).is_none() {
                break candidate;
            }
        };

        let chain_seed = Zeroizing::new(self.env.random_seed());
        let signing_seed = Zeroizing::new(self.env.random_seed());

        SenderKeyState::originated(
            key_id,
            SenderChainKey::new(0, *chain_seed),
            SenderSigningKey::from_seed(&signing_seed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{name::ProtocolAddress, storage::MemoryStore, system_env::SystemEnv};

    fn name() -> SenderKeyName {
        SenderKeyName::new("group", ProtocolAddress::new("alice", 1))
    }

    fn builder() -> GroupSessionBuilder<MemoryStore, SystemEnv> {
        GroupSessionBuilder::from_parts(
            MemoryStore::new(),
            SystemEnv::new(),
            SenderKeyLocks::new(),
            GroupConfig::default(),
        )
    }

    #[test]
    fn create_is_idempotent() {
        let builder = builder();

        let first = builder.create(&name()).unwrap();
        let second = builder.create(&name()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.iteration(), 0);
        assert_eq!(builder.store.load_sender_key(&name()).unwrap().len(), 1);
    }

    #[test]
    fn rotate_adds_new_epoch() {
        let builder = builder();

        let first = builder.create(&name()).unwrap();
        let rotated = builder.rotate(&name()).unwrap();

        assert_ne!(first.key_id(), rotated.key_id());
        assert_ne!(first.chain_key(), rotated.chain_key());
        assert_ne!(first.signing_key(), rotated.signing_key());

        let record = builder.store.load_sender_key(&name()).unwrap();
        assert_eq!(record.key_ids(), vec![rotated.key_id(), first.key_id()]);
    }

    #[test]
    fn rotate_without_epoch_creates_one() {
        let builder = builder();
        let message = builder.rotate(&name()).unwrap();

        assert_eq!(builder.create(&name()).unwrap(), message);
    }

    #[test]
    fn process_adds_received_epoch() {
        let sender = builder();
        let receiver = builder();

        let message = sender.create(&name()).unwrap();
        receiver.process(&name(), &message).unwrap();

        let record = receiver.store.load_sender_key(&name()).unwrap();
        let state = record.state(message.key_id()).unwrap();
        assert!(!state.is_originated());
        assert_eq!(state.chain_key().seed(), message.chain_key());
    }

    #[test]
    fn reprocessing_is_a_no_op() {
        let sender = builder();
        let receiver = builder();

        let message = sender.create(&name()).unwrap();
        receiver.process(&name(), &message).unwrap();
        receiver.process(&name(), &message).unwrap();

        assert_eq!(receiver.store.load_sender_key(&name()).unwrap().len(), 1);
    }

    #[test]
    fn record_bounded_by_max_states() {
        let builder = GroupSessionBuilder::from_parts(
            MemoryStore::new(),
            SystemEnv::new(),
            SenderKeyLocks::new(),
            GroupConfig { max_states: 2, ..GroupConfig::default() },
        );

        builder.create(&name()).unwrap();
        builder.rotate(&name()).unwrap();
        let newest = builder.rotate(&name()).unwrap();

        let record = builder.store.load_sender_key(&name()).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.newest().map(SenderKeyState::key_id), Some(newest.key_id()));
    }
}
