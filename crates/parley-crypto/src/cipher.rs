//! Message encryption using AES-256-GCM
//!
//! The byte-level functions take the nonce from the caller. The text-level
//! [`encrypt`] draws a fresh nonce from an [`Environment`] on every call.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};

use crate::{
    env::Environment,
    envelope::{Envelope, NONCE_SIZE},
    error::CipherError,
    key::ConversationKey,
};

/// Encrypt bytes under `key` with a caller-provided nonce.
///
/// # Security
///
/// - A nonce MUST NOT be reused with the same key
/// - Caller MUST provide cryptographically secure random nonces in production
pub fn encrypt_bytes(plaintext: &[u8], key: &ConversationKey, nonce: [u8; NONCE_SIZE]) -> Envelope {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce), plaintext) else {
        unreachable!("AES-256-GCM encryption cannot fail for in-memory message sizes");
    };

    Envelope { nonce, ciphertext }
}

/// Decrypt an envelope under `key`.
///
/// # Errors
///
/// - `AuthenticationFailure`: tag mismatch (tampered envelope or wrong key)
pub fn decrypt_bytes(envelope: &Envelope, key: &ConversationKey) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| CipherError::AuthenticationFailure)
}

/// Encrypt UTF-8 text and return the base64 envelope.
///
/// Every call draws a fresh 12-byte nonce, so encrypting the same text twice
/// yields different envelopes.
pub fn encrypt(plaintext: &str, key: &ConversationKey, env: &impl Environment) -> String {
    encrypt_bytes(plaintext.as_bytes(), key, env.random_array()).encode()
}

/// Decrypt a base64 envelope back to UTF-8 text.
///
/// # Errors
///
/// - `MalformedEnvelope`: not base64, shorter than a nonce, or the
///   authenticated plaintext is not UTF-8
/// - `AuthenticationFailure`: tag mismatch (tampered envelope or wrong key)
pub fn decrypt(envelope: &str, key: &ConversationKey) -> Result<String, CipherError> {
    let envelope = Envelope::decode(envelope)?;
    let plaintext = decrypt_bytes(&envelope, key)?;

    String::from_utf8(plaintext)
        .map_err(|e| CipherError::malformed(format!("plaintext is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::*;
    use crate::{envelope::TAG_SIZE, env::SystemEnv, key::KEY_SIZE};

    fn test_key(fill: u8) -> ConversationKey {
        let mut material = [0u8; KEY_SIZE];
        for (i, byte) in material.iter_mut().enumerate() {
            *byte = fill.wrapping_add(i as u8);
        }
        ConversationKey::from_array(material)
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key(0);
        let env = SystemEnv::new();

        let envelope = encrypt("Hello, World!", &key, &env);
        let decrypted = decrypt(&envelope, &key).unwrap();

        assert_eq!(decrypted, "Hello, World!");
    }

    #[test]
    fn encrypt_decrypt_empty_message() {
        let key = test_key(1);
        let envelope = encrypt("", &key, &SystemEnv::new());

        assert_eq!(decrypt(&envelope, &key).unwrap(), "");
    }

    #[test]
    fn encrypt_decrypt_multibyte_text() {
        let key = test_key(2);
        let text = "héllo wörld 👋 こんにちは";

        let envelope = encrypt(text, &key, &SystemEnv::new());
        assert_eq!(decrypt(&envelope, &key).unwrap(), text);
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let key = test_key(0);
        let envelope = encrypt_bytes(b"test message", &key, [0u8; NONCE_SIZE]);

        assert_eq!(envelope.ciphertext.len(), b"test message".len() + TAG_SIZE);
        assert_eq!(envelope.plaintext_len(), b"test message".len());
    }

    #[test]
    fn same_text_encrypts_differently() {
        let key = test_key(0);
        let env = SystemEnv::new();

        let e1 = encrypt("same", &key, &env);
        let e2 = encrypt("same", &key, &env);

        assert_ne!(e1, e2);
    }

    #[test]
    fn different_nonces_produce_different_ciphertext() {
        let key = test_key(0);

        let e1 = encrypt_bytes(b"test", &key, [0x00; NONCE_SIZE]);
        let e2 = encrypt_bytes(b"test", &key, [0xFF; NONCE_SIZE]);

        assert_ne!(e1.ciphertext, e2.ciphertext);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let envelope = encrypt("secret message", &test_key(0), &SystemEnv::new());

        let result = decrypt(&envelope, &test_key(100));
        assert_eq!(result, Err(CipherError::AuthenticationFailure));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let key = test_key(0);
        let mut envelope = encrypt_bytes(b"original message", &key, [3u8; NONCE_SIZE]);

        envelope.ciphertext[0] ^= 0xFF;

        assert_eq!(decrypt_bytes(&envelope, &key), Err(CipherError::AuthenticationFailure));
    }

    #[test]
    fn tampered_nonce_fails_authentication() {
        let key = test_key(0);
        let mut envelope = encrypt_bytes(b"original message", &key, [3u8; NONCE_SIZE]);

        envelope.nonce[0] ^= 0x01;

        assert_eq!(decrypt_bytes(&envelope, &key), Err(CipherError::AuthenticationFailure));
    }

    #[test]
    fn decrypt_empty_and_short_input_is_malformed() {
        let key = test_key(0);

        assert!(matches!(decrypt("", &key), Err(CipherError::MalformedEnvelope { .. })));
        assert!(matches!(decrypt("short", &key), Err(CipherError::MalformedEnvelope { .. })));
    }

    #[test]
    fn decrypt_non_utf8_plaintext_is_malformed() {
        let key = test_key(0);
        let envelope = encrypt_bytes(&[0xFF, 0xFE, 0xFD], &key, [5u8; NONCE_SIZE]).encode();

        let result = decrypt(&envelope, &key);
        assert!(matches!(
            result,
            Err(CipherError::MalformedEnvelope { reason }) if reason.contains("UTF-8")
        ));
    }

    #[test]
    fn envelope_embeds_nonce_prefix() {
        let key = test_key(0);
        let nonce = [0xAB; NONCE_SIZE];

        let encoded = encrypt_bytes(b"hi", &key, nonce).encode();
        let raw = STANDARD.decode(encoded).unwrap();

        assert_eq!(&raw[..NONCE_SIZE], &nonce);
        assert_eq!(raw.len(), NONCE_SIZE + 2 + TAG_SIZE);
    }
}
