//! Redb-backed durable key store.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Keys
//! survive process restarts, the role local storage plays in a browser.

use std::{path::Path, sync::Arc};

use parley_crypto::ConversationKey;
use redb::{Database, ReadableTable, TableDefinition};

use super::{
    ConversationId, KeyLookup, KeyStore, StorageError,
    record::{decode_key_record, encode_key_record},
};

/// Table: conversation_keys
/// Key: namespaced storage key (`parley.conversation-key.<id>`)
/// Value: CBOR-encoded key record
const CONVERSATION_KEYS: TableDefinition<&str, &[u8]> = TableDefinition::new("conversation_keys");

/// Durable key store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbKeyStore {
    db: Arc<Database>,
}

impl RedbKeyStore {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the `conversation_keys` table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ =
                txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KeyStore for RedbKeyStore {
    fn store(
        &self,
        conversation_id: &ConversationId,
        key: &ConversationKey,
    ) -> Result<(), StorageError> {
        let bytes = encode_key_record(key)?;
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

            let storage_key = conversation_id.storage_key();
            table
                .insert(storage_key.as_str(), bytes.as_slice())
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    fn retrieve(&self, conversation_id: &ConversationId) -> Result<KeyLookup, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table =
            txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

        let storage_key = conversation_id.storage_key();
        let value =
            table.get(storage_key.as_str()).map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(value.map_or(KeyLookup::Absent, |bytes| decode_key_record(bytes.value())))
    }

    fn remove(&self, conversation_id: &ConversationId) -> Result<bool, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let removed = {
            let mut table =
                txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

            let storage_key = conversation_id.storage_key();
            table
                .remove(storage_key.as_str())
                .map_err(|e| StorageError::Io(e.to_string()))?
                .is_some()
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(removed)
    }

    fn conversation_ids(&self) -> Result<Vec<ConversationId>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table =
            txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

        let mut ids = Vec::new();
        for entry in table.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (key, _) = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            if let Some(id) = ConversationId::from_storage_key(key.value()) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    fn clear(&self) -> Result<usize, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let removed = {
            let mut table =
                txn.open_table(CONVERSATION_KEYS).map_err(|e| StorageError::Io(e.to_string()))?;

            let mut keys = Vec::new();
            for entry in table.iter().map_err(|e| StorageError::Io(e.to_string()))? {
                let (key, _) = entry.map_err(|e| StorageError::Io(e.to_string()))?;
                keys.push(key.value().to_string());
            }

            for key in &keys {
                table.remove(key.as_str()).map_err(|e| StorageError::Io(e.to_string()))?;
            }

            keys.len()
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(removed)
    }
}
