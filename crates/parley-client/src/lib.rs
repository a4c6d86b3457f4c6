//! Client
//!
//! Per-conversation message encryption for Parley clients. Each conversation
//! gets one symmetric key, created lazily on the device that first needs it
//! and persisted through a [`KeyStore`].
//!
//! # Components
//!
//! - [`ConversationKeyManager`]: get-or-create of conversation keys
//! - [`ConversationCipher`]: seals and opens messages per conversation
//! - [`MessageTransport`]: boundary to the messaging backend
//! - [`SecureMessenger`]: cipher plus transport
//!
//! # Failure model
//!
//! A message that cannot be opened is reported per message
//! ([`MessageOutcome::Undecryptable`]) and rendered with fallback text. Key
//! store failures and corrupt key records fail the operation instead; no key
//! is ever invented to paper over them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod conversation;
mod error;
mod manager;
mod transport;

pub use conversation::{
    CANNOT_DECRYPT_ON_DEVICE, ConversationCipher, MessageOutcome, UNABLE_TO_DISPLAY,
    UndecryptableReason,
};
pub use error::{ClientError, TransportError};
pub use manager::{ConversationKeyManager, CorruptKeyPolicy, ManagerConfig};
pub use parley_crypto::{Environment, SystemEnv};
pub use parley_store::{ConversationId, KeyStore};
pub use transport::{Ack, MemoryTransport, MessageTransport, SecureMessenger};
