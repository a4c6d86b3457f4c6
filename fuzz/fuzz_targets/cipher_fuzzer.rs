//! Fuzz target for AES-256-GCM sealing
//!
//! # Strategy
//!
//! - Arbitrary keys, nonces, and plaintexts
//! - Single-byte corruption anywhere in the sealed bytes
//!
//! # Invariants
//!
//! - Encrypt/decrypt roundtrip succeeds
//! - Any corrupted byte after the nonce fails authentication
//! - A different key fails authentication

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_crypto::{
    decrypt_bytes, encrypt_bytes, CipherError, ConversationKey, KEY_SIZE, NONCE_SIZE,
};

#[derive(Debug, Clone, Arbitrary)]
struct CipherScenario {
    key: [u8; KEY_SIZE],
    other_key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    plaintext: Vec<u8>,
    corrupt_at: usize,
    corrupt_mask: u8,
}

fuzz_target!(|scenario: CipherScenario| {
    let key = ConversationKey::from_array(scenario.key);
    let envelope = encrypt_bytes(&scenario.plaintext, &key, scenario.nonce);

    assert_eq!(envelope.plaintext_len(), scenario.plaintext.len());
    assert_eq!(decrypt_bytes(&envelope, &key).ok(), Some(scenario.plaintext.clone()));

    if scenario.corrupt_mask != 0 {
        let mut tampered = envelope.clone();
        let index = scenario.corrupt_at % tampered.ciphertext.len();
        tampered.ciphertext[index] ^= scenario.corrupt_mask;
        assert_eq!(decrypt_bytes(&tampered, &key), Err(CipherError::AuthenticationFailure));
    }

    if scenario.other_key != scenario.key {
        let other = ConversationKey::from_array(scenario.other_key);
        assert_eq!(decrypt_bytes(&envelope, &other), Err(CipherError::AuthenticationFailure));
    }
});
