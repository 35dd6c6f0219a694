use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{SenderKeyStore, StorageError};
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// In-memory store for tests and ephemeral sessions.
///
/// All state is wrapped in Arc<Mutex<>> to allow Clone and concurrent access.
/// Records are cloned in and out, so callers never alias stored state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<SenderKeyName, SenderKeyRecord>>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names with a stored record.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.records()?.len())
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.records()?.is_empty())
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<SenderKeyName, SenderKeyRecord>>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("memory store mutex poisoned".to_string()))
    }
}

impl SenderKeyStore for MemoryStore {
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<SenderKeyRecord, StorageError> {
        Ok(self.records()?.get(name).cloned().unwrap_or_default())
    }

    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StorageError> {
        self.records()?.insert(name.clone(), record.clone());
        Ok(())
    }

    fn remove_sender_key(&self, name: &SenderKeyName) -> Result<(), StorageError> {
        self.records()?.remove(name);
        Ok(())
    }
}
