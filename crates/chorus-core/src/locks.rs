//! Per-name lock table.
//!
//! Encrypt and decrypt both load, mutate and store the same record, so two
//! operations on one [`SenderKeyName`] must not interleave. Operations on
//! different names touch disjoint records and may run in parallel.
//!
//! ```text
//! hash(name) % 64 ──► shard ──► Mutex<()>
//! ```
//!
//! Two names that collide on a shard serialize unnecessarily but never
//! incorrectly.

use std::{
    hash::{DefaultHasher, Hash, Hasher},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

use crate::name::SenderKeyName;

/// Number of mutex shards.
pub const SHARD_COUNT: usize = 64;

static GLOBAL: LazyLock<SenderKeyLocks> = LazyLock::new(SenderKeyLocks::new);

/// Sharded mutexes keyed by [`SenderKeyName`].
///
/// Clones share the same shards.
#[derive(Clone)]
pub struct SenderKeyLocks {
    shards: Arc<[Mutex<()>; SHARD_COUNT]>,
}

impl SenderKeyLocks {
    /// Fresh, independent lock table.
    pub fn new() -> Self {
        Self { shards: Arc::new(std::array::from_fn(|_| Mutex::new(()))) }
    }

    /// Process-wide table shared by builders and ciphers constructed without
    /// an explicit one.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Block until no other operation holds `name`'s shard.
    ///
    /// The guard protects no data, so a shard poisoned by a panicking
    /// holder is reclaimed.
    pub fn lock(&self, name: &SenderKeyName) -> MutexGuard<'_, ()> {
        self.shards[shard_index(name)].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two tables share shards.
    pub fn shares_shards_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shards, &other.shards)
    }
}

impl Default for SenderKeyLocks {
    fn default() -> Self {
        Self::new()
    }
}

fn shard_index(name: &SenderKeyName) -> usize {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    (hasher.finish() % SHARD_COUNT as u64) as usize
}
