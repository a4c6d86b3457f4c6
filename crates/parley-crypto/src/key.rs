//! Conversation keys.
//!
//! One 256-bit AES-GCM key per conversation id. The key is generated once on
//! a device and reused for every message in that conversation.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::Zeroize;

use crate::{env::Environment, error::CipherError};

/// Size of a conversation key (AES-256)
pub const KEY_SIZE: usize = 32;

/// A symmetric key bound to one conversation.
///
/// # Security
///
/// - Material is zeroized on drop
/// - `Debug` never prints key bytes
#[derive(Clone, PartialEq, Eq)]
pub struct ConversationKey {
    material: [u8; KEY_SIZE],
}

impl ConversationKey {
    /// Generate a fresh random key.
    pub fn generate(env: &impl Environment) -> Self {
        Self { material: env.random_array() }
    }

    /// Wrap existing key material.
    pub fn from_array(material: [u8; KEY_SIZE]) -> Self {
        Self { material }
    }

    /// Import raw key material.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` unless `bytes` is exactly [`KEY_SIZE`] long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let material: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CipherError::InvalidKeyLength { expected: KEY_SIZE, actual: bytes.len() }
        })?;
        Ok(Self { material })
    }

    /// Import a key exported with [`to_base64`](Self::to_base64).
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let mut bytes =
            STANDARD.decode(encoded).map_err(|e| CipherError::InvalidKeyEncoding(e.to_string()))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.material
    }

    /// Export the raw key as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.material)
    }
}

impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConversationKey([REDACTED])")
    }
}
