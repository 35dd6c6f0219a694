//! Storage abstraction for sender-key records.
//!
//! Trait-based abstraction over where records live. The trait is synchronous:
//! ratchet correctness depends on a store being durable before it returns,
//! and a lock is held across every load → mutate → store sequence.

mod chaotic;
mod error;
mod memory;
mod redb;

pub use chaotic::ChaoticStore;
pub use error::StorageError;
pub use memory::MemoryStore;

pub use self::redb::RedbStore;
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// Keyed store mapping a [`SenderKeyName`] to its [`SenderKeyRecord`].
///
/// Must be Clone (shared by builders and ciphers), Send + Sync (thread-safe),
/// and synchronous (no async methods). Implementations typically share
/// internal state via Arc, so clones access the same underlying storage.
pub trait SenderKeyStore: Clone + Send + Sync + 'static {
    /// Load the record for `name`.
    ///
    /// Returns an empty record if nothing has been stored, never an error
    /// for absence.
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<SenderKeyRecord, StorageError>;

    /// Store the record for `name`, replacing any previous one.
    ///
    /// # Invariants
    ///
    /// - Post: the record is durable when this returns `Ok`
    /// - Post: on `Err` the previously stored record is unchanged
    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StorageError>;

    /// Forget the record for `name`, e.g. after leaving a group.
    ///
    /// Removing an absent record is a no-op.
    fn remove_sender_key(&self, name: &SenderKeyName) -> Result<(), StorageError>;
}
