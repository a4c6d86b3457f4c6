//! Fuzz target for envelope decoding
//!
//! Feeds arbitrary text to `Envelope::decode` and `decrypt`.
//!
//! The fuzzer should NEVER panic. Invalid base64, short input, and forged
//! tags must all come back as `CipherError`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_crypto::{decrypt, ConversationKey, Envelope, CipherError, KEY_SIZE, NONCE_SIZE};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(envelope) = Envelope::decode(text) {
        assert_eq!(envelope.nonce.len(), NONCE_SIZE);
        // Re-encoding a decoded envelope is canonical for padded base64
        assert_eq!(Envelope::decode(&envelope.encode()).ok(), Some(envelope));
    }

    let key = ConversationKey::from_array([0x5a; KEY_SIZE]);
    match decrypt(text, &key) {
        Ok(_) | Err(CipherError::AuthenticationFailure) | Err(CipherError::MalformedEnvelope { .. }) => {},
        Err(e) => panic!("unexpected error from decrypt: {e:?}"),
    }
});
