//! Conversation key manager.
//!
//! Lazily creates exactly one key per conversation and keeps it for the
//! lifetime of the process.
//!
//! # Lookup
//!
//! ```text
//! get_or_create_key(id)
//!   │
//!   ├─ cached? ──────────────────────────────► key
//!   │
//!   └─ KeyStore::retrieve(id)
//!        ├─ Found(key) ──────────────────────► key
//!        ├─ Absent ─► generate ─► store ─────► key
//!        ├─ Corrupt ─► CorruptKeyPolicy
//!        │     ├─ Fail ──────────────────────► Err(CorruptKey)
//!        │     └─ Replace ─► generate ─► store ► key
//!        └─ Err ─────────────────────────────► Err(KeyStoreUnavailable)
//! ```
//!
//! # Invariants
//!
//! - Concurrent callers for one conversation share a single in-flight
//!   creation, so at most one key is generated and stored per conversation
//! - A key is never handed out unless it is durably stored
//! - A failed creation leaves nothing cached; the next call retries
//!
//! Store calls are synchronous and run inline on the calling task. This suits
//! local backends such as redb; a slow or remote store would need to move
//! them onto `spawn_blocking`.

use std::{collections::HashMap, sync::Arc};

use parley_crypto::{ConversationKey, Environment};
use parley_store::{ConversationId, KeyLookup, KeyStore};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::ClientError;

/// What to do when a stored key record cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptKeyPolicy {
    /// Report [`ClientError::CorruptKey`] and leave the record untouched.
    #[default]
    Fail,
    /// Overwrite the record with a freshly generated key.
    ///
    /// Messages sealed under the lost key become undecryptable.
    Replace,
}

/// Key manager configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Handling of undecodable key records
    pub corrupt_key_policy: CorruptKeyPolicy,
}

type KeyCell = Arc<OnceCell<ConversationKey>>;

/// Hands out the key for a conversation, creating it on first use.
///
/// Clone is cheap; clones share the store and the key cache.
#[derive(Clone)]
pub struct ConversationKeyManager<S: KeyStore, E: Environment> {
    store: S,
    env: E,
    config: ManagerConfig,
    /// One cell per conversation with a cached or in-flight key. Never locked
    /// while a key is being created; `forget` holds it across store removal.
    keys: Arc<Mutex<HashMap<ConversationId, KeyCell>>>,
}

impl<S: KeyStore, E: Environment> ConversationKeyManager<S, E> {
    /// Create a manager with the default configuration.
    pub fn new(store: S, env: E) -> Self {
        Self::with_config(store, env, ManagerConfig::default())
    }

    /// Create a manager with an explicit configuration.
    pub fn with_config(store: S, env: E, config: ManagerConfig) -> Self {
        Self { store, env, config, keys: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Backing key store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Randomness source used for key generation.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Active configuration.
    pub fn config(&self) -> ManagerConfig {
        self.config
    }

    /// Return the key for `conversation_id`, creating and storing one if
    /// none exists yet.
    ///
    /// # Errors
    ///
    /// - `ClientError::KeyStoreUnavailable` if the store cannot be read or
    ///   the new key cannot be written
    /// - `ClientError::CorruptKey` if the stored record is undecodable and the
    ///   policy is [`CorruptKeyPolicy::Fail`]
    pub async fn get_or_create_key(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<ConversationKey, ClientError> {
        loop {
            let cell = {
                let mut keys = self.keys.lock().await;
                let cell = keys.entry(conversation_id.clone()).or_default();
                if let Some(key) = cell.get() {
                    debug!(conversation_id = %conversation_id, "conversation key cache hit");
                    return Ok(key.clone());
                }
                Arc::clone(cell)
            };

            let result =
                cell.get_or_try_init(|| async { self.load_or_create(conversation_id) }).await;

            let mut keys = self.keys.lock().await;
            let registered = keys.get(conversation_id).is_some_and(|c| Arc::ptr_eq(c, &cell));

            match result {
                // Still registered means no `forget` ran since the store write
                Ok(key) if registered => return Ok(key.clone()),
                Ok(_) => {
                    debug!(conversation_id = %conversation_id, "key forgotten during creation, retrying");
                },
                Err(e) => {
                    if registered && !cell.initialized() {
                        keys.remove(conversation_id);
                    }
                    return Err(e);
                },
            }
        }
    }

    /// Delete the key for `conversation_id` from the store and the cache.
    ///
    /// Returns whether a stored key existed. Messages sealed under it can no
    /// longer be opened on this device. The cache lock is held across the
    /// store removal so no caller is handed the key once removal has begun.
    pub async fn forget(&self, conversation_id: &ConversationId) -> Result<bool, ClientError> {
        let mut keys = self.keys.lock().await;

        let removed = self.store.remove(conversation_id).map_err(|e| {
            warn!(conversation_id = %conversation_id, error = %e, "failed to remove conversation key");
            ClientError::from(e)
        })?;

        keys.remove(conversation_id);
        debug!(conversation_id = %conversation_id, removed, "forgot conversation key");

        Ok(removed)
    }

    /// Number of conversations whose key is cached in this process.
    pub async fn cached_conversations(&self) -> usize {
        self.keys.lock().await.values().filter(|cell| cell.initialized()).count()
    }

    fn load_or_create(&self, conversation_id: &ConversationId) -> Result<ConversationKey, ClientError> {
        let lookup = self.store.retrieve(conversation_id).map_err(|e| {
            warn!(conversation_id = %conversation_id, error = %e, "key store unavailable");
            ClientError::from(e)
        })?;

        match lookup {
            KeyLookup::Found(key) => {
                debug!(conversation_id = %conversation_id, "loaded conversation key");
                Ok(key)
            },
            KeyLookup::Absent => self.create_key(conversation_id),
            KeyLookup::Corrupt { reason } => match self.config.corrupt_key_policy {
                CorruptKeyPolicy::Fail => {
                    warn!(conversation_id = %conversation_id, %reason, "stored conversation key is corrupt");
                    Err(ClientError::CorruptKey { conversation_id: conversation_id.clone(), reason })
                },
                CorruptKeyPolicy::Replace => {
                    warn!(conversation_id = %conversation_id, %reason, "replacing corrupt conversation key");
                    self.create_key(conversation_id)
                },
            },
        }
    }

    fn create_key(&self, conversation_id: &ConversationId) -> Result<ConversationKey, ClientError> {
        let key = ConversationKey::generate(&self.env);

        self.store.store(conversation_id, &key).map_err(|e| {
            warn!(conversation_id = %conversation_id, error = %e, "failed to store new conversation key");
            ClientError::from(e)
        })?;

        debug!(conversation_id = %conversation_id, "created conversation key");
        Ok(key)
    }
}
