//! Client error types.

use parley_crypto::CipherError;
use parley_store::{ConversationId, StorageError};
use thiserror::Error;

/// Errors from the message transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Backend could not be reached.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Errors from client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Sealing or opening a message failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Key store could not be read or written.
    ///
    /// No key is fabricated in this case; the operation fails.
    #[error("key store unavailable: {0}")]
    KeyStoreUnavailable(StorageError),

    /// A key record exists but cannot be decoded.
    #[error("stored key for conversation {conversation_id} is corrupt: {reason}")]
    CorruptKey {
        /// Conversation whose key is unreadable
        conversation_id: ConversationId,
        /// Why decoding failed
        reason: String,
    },

    /// Conversation identifiers must be non-empty.
    #[error("invalid conversation id: must not be empty")]
    InvalidConversationId,

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Returns true if the failure concerns a single message.
    ///
    /// Message-local failures are shown inline in place of that message and
    /// the conversation carries on. Everything else (store, transport) is
    /// surfaced to the user as a conversation-level problem.
    pub fn is_message_local(&self) -> bool {
        match self {
            Self::Cipher(e) => e.is_message_local(),
            Self::KeyStoreUnavailable(_)
            | Self::CorruptKey { .. }
            | Self::InvalidConversationId
            | Self::Transport(_) => false,
        }
    }
}

impl From<StorageError> for ClientError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidConversationId => Self::InvalidConversationId,
            other => Self::KeyStoreUnavailable(other),
        }
    }
}
