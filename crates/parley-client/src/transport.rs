//! Message transport boundary.
//!
//! The messaging backend only ever sees envelopes. [`SecureMessenger`] sits
//! between the UI and a [`MessageTransport`], sealing on the way out and
//! opening on the way in.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use parley_crypto::Environment;
use parley_store::{ConversationId, KeyStore};
use tracing::debug;

use crate::{ClientError, ConversationCipher, MessageOutcome, TransportError};

/// Acknowledgement of a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Backend-assigned message id
    pub message_id: u64,
}

/// Carries envelopes to and from the messaging backend.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// All envelopes posted to `conversation_id`, oldest first.
    async fn fetch_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<String>, TransportError>;

    /// Post an envelope to `conversation_id`.
    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        envelope: &str,
    ) -> Result<Ack, TransportError>;
}

#[derive(Default)]
struct MemoryTransportInner {
    next_message_id: u64,
    conversations: HashMap<ConversationId, Vec<String>>,
}

/// In-process transport that keeps every conversation's envelopes in memory.
///
/// Clones share state, so two messengers on one `MemoryTransport` behave like
/// two devices talking through the same backend.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryTransportInner>>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an envelope without going through a messenger.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn inject(&self, conversation_id: &ConversationId, envelope: impl Into<String>) -> Ack {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.next_message_id += 1;
        let message_id = inner.next_message_id;
        inner.conversations.entry(conversation_id.clone()).or_default().push(envelope.into());
        Ack { message_id }
    }
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    async fn fetch_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<String>, TransportError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner.conversations.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        envelope: &str,
    ) -> Result<Ack, TransportError> {
        Ok(self.inject(conversation_id, envelope))
    }
}

/// End-to-end messaging over an untrusted transport.
pub struct SecureMessenger<T: MessageTransport, S: KeyStore, E: Environment> {
    transport: T,
    cipher: ConversationCipher<S, E>,
}

impl<T: MessageTransport, S: KeyStore, E: Environment> SecureMessenger<T, S, E> {
    /// Combine a transport with a conversation cipher.
    pub fn new(transport: T, cipher: ConversationCipher<S, E>) -> Self {
        Self { transport, cipher }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Seal `plaintext` and post it to `conversation_id`.
    pub async fn send(
        &self,
        conversation_id: &ConversationId,
        plaintext: &str,
    ) -> Result<Ack, ClientError> {
        let envelope = self.cipher.encrypt_for_conversation(conversation_id, plaintext).await?;
        let ack = self.transport.send_message(conversation_id, &envelope).await?;

        debug!(conversation_id = %conversation_id, message_id = ack.message_id, "sent message");
        Ok(ack)
    }

    /// Fetch and open every message in `conversation_id`.
    pub async fn receive(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<MessageOutcome>, ClientError> {
        let envelopes = self.transport.fetch_messages(conversation_id).await?;
        self.cipher.decrypt_all(conversation_id, envelopes).await
    }
}
