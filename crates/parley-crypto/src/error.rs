//! Error types for cipher and key operations

use thiserror::Error;

/// Errors from encrypting, decrypting, or decoding key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The GCM tag did not verify.
    ///
    /// Either the envelope was tampered with or it was sealed under a
    /// different key (for example on another device).
    #[error("authentication failed: wrong key or tampered envelope")]
    AuthenticationFailure,

    /// The envelope cannot be parsed or does not hold valid text.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// What was wrong with the input
        reason: String,
    },

    /// Key material has the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length
        expected: usize,
        /// Actual key length
        actual: usize,
    },

    /// Exported key text could not be decoded
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}

impl CipherError {
    /// Returns true if the failure concerns one message only.
    ///
    /// Such failures are rendered inline for that message; they never block
    /// the rest of a conversation and are never retried.
    pub fn is_message_local(&self) -> bool {
        match self {
            Self::AuthenticationFailure | Self::MalformedEnvelope { .. } => true,
            Self::InvalidKeyLength { .. } | Self::InvalidKeyEncoding(_) => false,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failure_is_message_local() {
        assert!(CipherError::AuthenticationFailure.is_message_local());
    }

    #[test]
    fn malformed_envelope_is_message_local() {
        assert!(CipherError::malformed("too short").is_message_local());
    }

    #[test]
    fn key_errors_are_not_message_local() {
        let err = CipherError::InvalidKeyLength { expected: 32, actual: 16 };
        assert!(!err.is_message_local());
        assert!(!CipherError::InvalidKeyEncoding("bad".to_string()).is_message_local());
    }

    #[test]
    fn error_display() {
        let err = CipherError::InvalidKeyLength { expected: 32, actual: 7 };
        assert_eq!(err.to_string(), "invalid key length: expected 32, got 7");

        let err = CipherError::malformed("shorter than nonce");
        assert_eq!(err.to_string(), "malformed envelope: shorter than nonce");
    }
}
