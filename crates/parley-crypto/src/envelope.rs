//! Message envelopes: `base64(nonce ‖ ciphertext ‖ tag)`
//!
//! The envelope is the only form in which an encrypted message leaves this
//! crate. It is opaque to the transport carrying it.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::CipherError;

/// AES-GCM nonce size (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// One encrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The 12-byte nonce, unique per encryption under a key
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext including the 16-byte GCM tag
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }

    /// Concatenated `nonce ‖ ciphertext` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split concatenated bytes into nonce and ciphertext.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope` if `bytes` is shorter than a nonce
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let Some((nonce, ciphertext)) = bytes.split_first_chunk::<NONCE_SIZE>() else {
            return Err(CipherError::malformed(format!(
                "{} bytes is shorter than the {NONCE_SIZE}-byte nonce",
                bytes.len()
            )));
        };

        Ok(Self { nonce: *nonce, ciphertext: ciphertext.to_vec() })
    }

    /// Standard base64 text form.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the base64 text form.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope` if the text is not base64 or decodes to fewer
    ///   than [`NONCE_SIZE`] bytes
    pub fn decode(encoded: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::malformed(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
