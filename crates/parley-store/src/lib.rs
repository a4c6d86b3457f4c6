//! Key storage for Parley
//!
//! Trait-based abstraction for persisting one symmetric key per conversation
//! on the local device. The trait is synchronous (no async) to keep backends
//! simple; callers in async code hold no locks across these calls.
//!
//! # Storage layout
//!
//! Every key lives under a namespaced storage key derived from its
//! conversation id (`parley.conversation-key.<id>`), holding a CBOR-encoded
//! [`record`]. Writes overwrite; there is no merge or versioning.
//!
//! # Lookup results
//!
//! [`KeyStore::retrieve`] distinguishes three outcomes so callers never
//! confuse a broken store with an empty one:
//!
//! - [`KeyLookup::Found`]: a valid key is stored
//! - [`KeyLookup::Absent`]: nothing stored yet
//! - [`KeyLookup::Corrupt`]: bytes are stored but cannot be decoded
//!
//! Backend failures are reported separately as `Err(StorageError)`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod error;
mod memory;
pub mod record;
mod redb;

use std::fmt;

pub use chaotic::ChaoticKeyStore;
pub use error::StorageError;
pub use memory::MemoryKeyStore;
use parley_crypto::ConversationKey;

pub use self::redb::RedbKeyStore;

/// Prefix of every storage key written by a [`KeyStore`].
pub const KEY_NAMESPACE: &str = "parley.conversation-key.";

/// Opaque identifier of a conversation, assigned by the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap an externally assigned identifier.
    ///
    /// # Errors
    ///
    /// - `InvalidConversationId` if `id` is empty
    pub fn new(id: impl Into<String>) -> Result<Self, StorageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StorageError::InvalidConversationId);
        }
        Ok(Self(id))
    }

    /// The identifier as given by the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespaced storage key for this conversation's key record.
    pub fn storage_key(&self) -> String {
        format!("{KEY_NAMESPACE}{}", self.0)
    }

    /// Recover a conversation id from a storage key.
    ///
    /// Returns `None` for keys outside [`KEY_NAMESPACE`] or with an empty id.
    pub fn from_storage_key(storage_key: &str) -> Option<Self> {
        storage_key.strip_prefix(KEY_NAMESPACE).and_then(|id| Self::new(id).ok())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of looking up a conversation's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// A valid key is stored
    Found(ConversationKey),
    /// Nothing is stored for this conversation
    Absent,
    /// Stored bytes could not be decoded
    Corrupt {
        /// Why decoding failed
        reason: String,
    },
}

/// Storage abstraction for conversation keys
///
/// Must be Clone (shared between the key manager and tooling), Send + Sync
/// (thread-safe), and synchronous. Implementations share internal state via
/// Arc, so clones access the same underlying storage.
///
/// # Panics
///
/// Implementations may panic if internal synchronization primitives are
/// poisoned (a thread panicked while holding a lock).
pub trait KeyStore: Clone + Send + Sync + 'static {
    /// Persist `key` for `conversation_id`.
    ///
    /// Overwrites any existing key for this conversation.
    fn store(&self, conversation_id: &ConversationId, key: &ConversationKey)
    -> Result<(), StorageError>;

    /// Load the key for `conversation_id`.
    ///
    /// Returns `KeyLookup::Absent` (not an error) when nothing is stored and
    /// `KeyLookup::Corrupt` when stored bytes cannot be decoded.
    fn retrieve(&self, conversation_id: &ConversationId) -> Result<KeyLookup, StorageError>;

    /// Delete the key for `conversation_id`.
    ///
    /// Returns whether an entry existed.
    fn remove(&self, conversation_id: &ConversationId) -> Result<bool, StorageError>;

    /// List all conversations with a stored entry.
    ///
    /// Order is not guaranteed. Corrupt entries are included.
    fn conversation_ids(&self) -> Result<Vec<ConversationId>, StorageError>;

    /// Delete every stored key.
    ///
    /// Returns the number of entries removed.
    fn clear(&self) -> Result<usize, StorageError>;
}
