//! Sealing and opening messages per conversation.

use parley_crypto::{CipherError, Environment, decrypt, encrypt};
use parley_store::{ConversationId, KeyStore};
use tracing::debug;

use crate::{ClientError, ConversationKeyManager};

/// Inline text shown in place of a message that could not be parsed.
pub const UNABLE_TO_DISPLAY: &str = "unable to display message";

/// Inline text shown in place of a message sealed under another key.
pub const CANNOT_DECRYPT_ON_DEVICE: &str = "cannot decrypt this message on this device";

/// Why a single message could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndecryptableReason {
    /// Tag did not verify: sealed under a different key or tampered with.
    WrongKeyOrTampered,
    /// Envelope could not be decoded.
    Malformed(String),
}

impl From<CipherError> for UndecryptableReason {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::AuthenticationFailure => Self::WrongKeyOrTampered,
            CipherError::MalformedEnvelope { reason } => Self::Malformed(reason),
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Result of opening one message in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Message opened successfully
    Decrypted(String),
    /// Message could not be opened; the rest of the batch is unaffected
    Undecryptable {
        /// What went wrong
        reason: UndecryptableReason,
    },
}

impl MessageOutcome {
    /// Text to render for this message.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Decrypted(text) => text,
            Self::Undecryptable { reason: UndecryptableReason::WrongKeyOrTampered } => {
                CANNOT_DECRYPT_ON_DEVICE
            },
            Self::Undecryptable { reason: UndecryptableReason::Malformed(_) } => UNABLE_TO_DISPLAY,
        }
    }

    /// True if the message was opened.
    pub fn is_decrypted(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }
}

/// Seals and opens chat messages under each conversation's key.
#[derive(Clone)]
pub struct ConversationCipher<S: KeyStore, E: Environment> {
    keys: ConversationKeyManager<S, E>,
}

impl<S: KeyStore, E: Environment> ConversationCipher<S, E> {
    /// Wrap a key manager.
    pub fn new(keys: ConversationKeyManager<S, E>) -> Self {
        Self { keys }
    }

    /// Key manager used for lookups.
    pub fn keys(&self) -> &ConversationKeyManager<S, E> {
        &self.keys
    }

    /// Seal `plaintext` for `conversation_id`, creating the key on first use.
    pub async fn encrypt_for_conversation(
        &self,
        conversation_id: &ConversationId,
        plaintext: &str,
    ) -> Result<String, ClientError> {
        let key = self.keys.get_or_create_key(conversation_id).await?;
        Ok(encrypt(plaintext, &key, self.keys.env()))
    }

    /// Open an envelope received in `conversation_id`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Cipher(AuthenticationFailure)` if the envelope was
    ///   sealed under another device's key or tampered with
    /// - `ClientError::Cipher(MalformedEnvelope)` if it cannot be decoded
    /// - key lookup errors as in
    ///   [`ConversationKeyManager::get_or_create_key`]
    pub async fn decrypt_for_conversation(
        &self,
        conversation_id: &ConversationId,
        envelope: &str,
    ) -> Result<String, ClientError> {
        let key = self.keys.get_or_create_key(conversation_id).await?;
        Ok(decrypt(envelope, &key)?)
    }

    /// Open a batch of envelopes, one outcome per input, in order.
    ///
    /// Only a key lookup failure fails the whole call, since no message could
    /// be opened without the key.
    pub async fn decrypt_all<I, T>(
        &self,
        conversation_id: &ConversationId,
        envelopes: I,
    ) -> Result<Vec<MessageOutcome>, ClientError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let key = self.keys.get_or_create_key(conversation_id).await?;

        let outcomes: Vec<_> = envelopes
            .into_iter()
            .map(|envelope| match decrypt(envelope.as_ref(), &key) {
                Ok(plaintext) => MessageOutcome::Decrypted(plaintext),
                Err(e) => MessageOutcome::Undecryptable { reason: e.into() },
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_decrypted()).count();
        if failed > 0 {
            debug!(conversation_id = %conversation_id, failed, total = outcomes.len(), "undecryptable messages in batch");
        }

        Ok(outcomes)
    }
}
