#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use parley_crypto::ConversationKey;

use super::{
    ConversationId, KeyLookup, KeyStore, StorageError,
    record::{decode_key_record, encode_key_record},
};

/// In-memory key store for tests and short-lived clients
///
/// Maps namespaced storage keys to encoded records, mirroring a browser's
/// local storage. State is wrapped in Arc<Mutex<>> so clones share it. Uses
/// `lock().expect()`, which panics if the mutex is poisoned.
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryKeyStore {
    /// Create a new empty `MemoryKeyStore`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write raw bytes under a conversation's storage key.
    ///
    /// Bypasses record encoding so tests can simulate corrupted storage.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn insert_raw(&self, conversation_id: &ConversationId, bytes: Vec<u8>) {
        self.inner.lock().expect("Mutex poisoned").insert(conversation_id.storage_key(), bytes);
    }
}

impl KeyStore for MemoryKeyStore {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn store(
        &self,
        conversation_id: &ConversationId,
        key: &ConversationKey,
    ) -> Result<(), StorageError> {
        let bytes = encode_key_record(key)?;
        self.inner.lock().expect("Mutex poisoned").insert(conversation_id.storage_key(), bytes);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn retrieve(&self, conversation_id: &ConversationId) -> Result<KeyLookup, StorageError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        Ok(inner
            .get(&conversation_id.storage_key())
            .map_or(KeyLookup::Absent, |bytes| decode_key_record(bytes.as_slice())))
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn remove(&self, conversation_id: &ConversationId) -> Result<bool, StorageError> {
        Ok(self
            .inner
            .lock()
            .expect("Mutex poisoned")
            .remove(&conversation_id.storage_key())
            .is_some())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn conversation_ids(&self) -> Result<Vec<ConversationId>, StorageError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner.keys().filter_map(|key| ConversationId::from_storage_key(key.as_str())).collect())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn clear(&self) -> Result<usize, StorageError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        let removed = inner.len();
        inner.clear();
        Ok(removed)
    }
}
