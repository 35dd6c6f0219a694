//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety.
//! A record either is fully written or keeps its previous value.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};

use super::{SenderKeyStore, StorageError};
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// Table: sender_keys
/// Key: encoded SenderKeyName (see `encode_name_key`)
/// Value: CBOR-encoded SenderKeyRecord
const SENDER_KEYS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("sender_keys");

/// Durable store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a Redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(SENDER_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl SenderKeyStore for RedbStore {
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<SenderKeyRecord, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;

        let table = txn.open_table(SENDER_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

        let key = encode_name_key(name);

        match table.get(key.as_slice()).map_err(|e| StorageError::Io(e.to_string()))? {
            Some(value) => ciborium::from_reader(value.value())
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(SenderKeyRecord::new()),
        }
    }

    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StorageError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(record, &mut bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(SENDER_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

            let key = encode_name_key(name);
            table
                .insert(key.as_slice(), bytes.as_slice())
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    fn remove_sender_key(&self, name: &SenderKeyName) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(SENDER_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

            let key = encode_name_key(name);
            table.remove(key.as_slice()).map_err(|e| StorageError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }
}

/// Encode a name as an unambiguous byte key.
///
/// Layout: [group_len: 4 BE][group_id][name_len: 4 BE][name][device_id: 4 BE]
/// Length prefixes keep ("ab", "c") and ("a", "bc") distinct.
fn encode_name_key(name: &SenderKeyName) -> Vec<u8> {
    let group = name.group_id().as_bytes();
    let sender = name.sender().name().as_bytes();

    let mut key = Vec::with_capacity(12 + group.len() + sender.len());
    key.extend_from_slice(&(group.len() as u32).to_be_bytes());
    key.extend_from_slice(group);
    key.extend_from_slice(&(sender.len() as u32).to_be_bytes());
    key.extend_from_slice(sender);
    key.extend_from_slice(&name.sender().device_id().to_be_bytes());
    key
}

#[cfg(test)]
mod tests {
    use chorus_crypto::{SenderChainKey, SenderMessageKey, SenderSigningKey};
    use tempfile::tempdir;

    use super::*;
    use crate::{name::ProtocolAddress, state::SenderKeyState};

    fn name(group: &str, sender: &str) -> SenderKeyName {
        SenderKeyName::new(group, ProtocolAddress::new(sender, 1))
    }

    #[test]
    fn test_name_key_encoding() {
        let key = encode_name_key(&name("g", "alice"));

        assert_eq!(hex::encode(&key), "000000016700000005616c69636500000001");
    }

    #[test]
    fn test_name_key_is_unambiguous() {
        assert_ne!(encode_name_key(&name("ab", "c")), encode_name_key(&name("a", "bc")));
    }

    #[test]
    fn test_missing_record_loads_empty() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        assert!(store.load_sender_key(&name("g", "alice")).unwrap().is_empty());
    }

    #[test]
    fn test_record_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");

        let mut state = SenderKeyState::originated(
            42,
            SenderChainKey::new(5, [7u8; 32]),
            SenderSigningKey::from_seed(&[8u8; 32]),
        );
        state.add_message_key(SenderMessageKey::derive(3, [9u8; 32]), 10);
        let record = SenderKeyRecord::new().with_state(state, 5);

        {
            let store = RedbStore::open(&path).unwrap();
            store.store_sender_key(&name("g", "alice"), &record).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        let loaded = store.load_sender_key(&name("g", "alice")).unwrap();
        let loaded_state = loaded.state(42).unwrap();

        assert_eq!(loaded_state.chain_key().iteration(), 5);
        assert_eq!(loaded_state.chain_key().seed(), &[7u8; 32]);
        assert!(loaded_state.is_originated());
        assert!(loaded_state.has_message_key(3));
        assert_eq!(
            loaded_state.verifying_key(),
            SenderSigningKey::from_seed(&[8u8; 32]).verifying_key()
        );
    }

    #[test]
    fn test_remove_record() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();
        let state = SenderKeyState::originated(
            1,
            SenderChainKey::new(0, [0u8; 32]),
            SenderSigningKey::from_seed(&[1u8; 32]),
        );

        store
            .store_sender_key(&name("g", "alice"), &SenderKeyRecord::new().with_state(state, 5))
            .unwrap();
        store.remove_sender_key(&name("g", "alice")).unwrap();

        assert!(store.load_sender_key(&name("g", "alice")).unwrap().is_empty());
    }
}
