//! Stored key record format.
//!
//! Keys are persisted as CBOR:
//!
//! ```text
//! { version: 1, algorithm: "Aes256Gcm", material: [32 bytes] }
//! ```
//!
//! Any record that fails to decode, names an unknown version or algorithm,
//! or carries the wrong amount of key material decodes to
//! [`KeyLookup::Corrupt`].

use parley_crypto::{ConversationKey, KEY_SIZE};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{KeyLookup, StorageError};

/// Current record version
pub const RECORD_VERSION: u8 = 1;

/// Algorithm the stored material is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// 256-bit AES in GCM mode
    Aes256Gcm,
}

#[derive(Serialize, Deserialize)]
struct StoredKeyRecord {
    version: u8,
    algorithm: KeyAlgorithm,
    material: Vec<u8>,
}

impl Drop for StoredKeyRecord {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

/// Encode a key into its stored form.
pub fn encode_key_record(key: &ConversationKey) -> Result<Vec<u8>, StorageError> {
    let record = StoredKeyRecord {
        version: RECORD_VERSION,
        algorithm: KeyAlgorithm::Aes256Gcm,
        material: key.as_bytes().to_vec(),
    };

    let mut bytes = Vec::with_capacity(KEY_SIZE + 32);
    ciborium::into_writer(&record, &mut bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(bytes)
}

/// Decode stored bytes into a lookup result.
///
/// Never returns `KeyLookup::Absent`; absence is decided by the backend.
pub fn decode_key_record(bytes: &[u8]) -> KeyLookup {
    let record: StoredKeyRecord = match ciborium::from_reader(bytes) {
        Ok(record) => record,
        Err(e) => return KeyLookup::Corrupt { reason: format!("undecodable record: {e}") },
    };

    if record.version != RECORD_VERSION {
        return KeyLookup::Corrupt {
            reason: format!("unsupported record version {}", record.version),
        };
    }

    match ConversationKey::from_bytes(&record.material) {
        Ok(key) => KeyLookup::Found(key),
        Err(e) => KeyLookup::Corrupt { reason: e.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let key = ConversationKey::from_array([42u8; KEY_SIZE]);
        let bytes = encode_key_record(&key).unwrap();

        assert_eq!(decode_key_record(&bytes), KeyLookup::Found(key));
    }

    #[test]
    fn garbage_is_corrupt() {
        let lookup = decode_key_record(b"\xff\x00not cbor");
        assert!(matches!(lookup, KeyLookup::Corrupt { .. }));
    }

    #[test]
    fn empty_bytes_are_corrupt() {
        assert!(matches!(decode_key_record(&[]), KeyLookup::Corrupt { .. }));
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let record = StoredKeyRecord {
            version: 9,
            algorithm: KeyAlgorithm::Aes256Gcm,
            material: vec![0u8; KEY_SIZE],
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&record, &mut bytes).unwrap();

        assert!(matches!(
            decode_key_record(&bytes),
            KeyLookup::Corrupt { reason } if reason.contains("version 9")
        ));
    }

    #[test]
    fn truncated_material_is_corrupt() {
        let record = StoredKeyRecord {
            version: RECORD_VERSION,
            algorithm: KeyAlgorithm::Aes256Gcm,
            material: vec![0u8; 16],
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&record, &mut bytes).unwrap();

        assert!(matches!(
            decode_key_record(&bytes),
            KeyLookup::Corrupt { reason } if reason.contains("key length")
        ));
    }
}
