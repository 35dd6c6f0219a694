//! Shared fixtures for chorus-core integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chorus_core::{
    Environment, GroupCipher, GroupSessions, MemoryStore, ProtocolAddress, SenderKeyName,
    SenderKeyStore,
};
use chorus_proto::SenderKeyDistributionMessage;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Deterministic environment: the same seed yields the same key ids, chain
/// seeds and signing keys.
#[derive(Clone)]
pub struct SeededEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SeededEnv {
    pub fn new(seed: u64) -> Self {
        Self { rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
    }
}

impl Environment for SeededEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap().fill_bytes(buffer);
    }
}

/// Alice's first device sending to `group`.
pub fn alice_in(group: &str) -> SenderKeyName {
    SenderKeyName::new(group, ProtocolAddress::new("+14151111111", 1))
}

/// Alice's ratchet in the default test group.
pub fn alice() -> SenderKeyName {
    alice_in("test-group")
}

/// Sessions of one device backed by its own memory store.
pub fn device(seed: u64) -> GroupSessions<MemoryStore, SeededEnv> {
    GroupSessions::new(MemoryStore::new(), SeededEnv::new(seed))
}

/// A sending device and a receiving device that has processed the sender's
/// distribution message for `name`.
pub struct Pair<S: SenderKeyStore> {
    pub sender: GroupCipher<S>,
    pub receiver: GroupCipher<S>,
    pub distribution: SenderKeyDistributionMessage,
}

/// Set up `name` on `sender` and deliver the distribution to `receiver`.
pub fn connect<S: SenderKeyStore>(
    sender: &GroupSessions<S, SeededEnv>,
    receiver: &GroupSessions<S, SeededEnv>,
    name: &SenderKeyName,
) -> Pair<S> {
    let distribution = sender.builder().create(name).unwrap();
    receiver.builder().process(name, &distribution).unwrap();

    Pair {
        sender: sender.cipher(name.clone()),
        receiver: receiver.cipher(name.clone()),
        distribution,
    }
}

/// Fresh pair of memory-backed devices talking over `alice()`.
pub fn memory_pair() -> Pair<MemoryStore> {
    connect(&device(1), &device(2), &alice())
}
