//! Storage error types.
//!
//! Defines errors that can occur during key store operations:
//! - `Io`: Underlying storage system errors (quota, disabled storage, I/O)
//! - `Serialization`: Failed to encode a key record
//! - `InvalidConversationId`: Empty conversation identifier
//!
//! Undecodable stored records are not errors; they surface as
//! [`KeyLookup::Corrupt`](crate::KeyLookup::Corrupt).

use thiserror::Error;

/// Errors that can occur during key store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// I/O error (file system, database, quota, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Encoding a key record failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Conversation identifiers must be non-empty
    #[error("invalid conversation id: must not be empty")]
    InvalidConversationId,
}
