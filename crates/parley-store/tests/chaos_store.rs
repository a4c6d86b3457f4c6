//! Chaos property tests for `KeyStore` implementations
//!
//! These tests verify that key stores keep their invariants when wrapped in
//! `ChaoticKeyStore`:
//! - A failed write leaves no entry behind
//! - A successful write is read back exactly
//! - Listing reflects exactly the successful writes

use std::collections::HashMap;

use parley_crypto::{ConversationKey, KEY_SIZE};
use parley_store::{
    ChaoticKeyStore, ConversationId, KeyLookup, KeyStore, MemoryKeyStore, RedbKeyStore,
    StorageError,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn conv(i: usize) -> ConversationId {
    ConversationId::new(format!("conv-{i}")).unwrap()
}

/// Check every recorded key against the inner store.
fn verify_store<S: KeyStore>(store: &S, expected: &HashMap<ConversationId, ConversationKey>) {
    for (id, key) in expected {
        assert_eq!(store.retrieve(id).unwrap(), KeyLookup::Found(key.clone()));
    }

    let mut ids = store.conversation_ids().unwrap();
    ids.sort();
    let mut expected_ids: Vec<_> = expected.keys().cloned().collect();
    expected_ids.sort();
    assert_eq!(ids, expected_ids);
}

#[test]
fn prop_chaos_failed_writes_leave_nothing() {
    proptest!(|(
        failure_rate in 0.0..0.8,
        seed in any::<u64>(),
        count in 1usize..50,
    )| {
        let store = ChaoticKeyStore::with_seed(MemoryKeyStore::new(), failure_rate, seed);
        let mut written = HashMap::new();

        for i in 0..count {
            let key = ConversationKey::from_array([i as u8; KEY_SIZE]);
            match store.store(&conv(i), &key) {
                Ok(()) => {
                    written.insert(conv(i), key);
                },
                Err(StorageError::Io(_)) => {},
                Err(e) => panic!("Unexpected error: {e:?}"),
            }
        }

        // ORACLE: inner store holds exactly the successful writes
        verify_store(store.inner(), &written);
        prop_assert_eq!(store.inner().len(), written.len());
    });
}

#[test]
fn prop_chaos_reads_never_invent_keys() {
    proptest!(|(
        failure_rate in 0.0..0.5,
        seed in any::<u64>(),
        material in any::<[u8; KEY_SIZE]>(),
    )| {
        let inner = MemoryKeyStore::new();
        let key = ConversationKey::from_array(material);
        inner.store(&conv(0), &key).unwrap();

        let store = ChaoticKeyStore::with_seed(inner, failure_rate, seed);

        for _ in 0..20 {
            match store.retrieve(&conv(0)) {
                Ok(lookup) => prop_assert_eq!(lookup, KeyLookup::Found(key.clone())),
                Err(e) => prop_assert!(matches!(e, StorageError::Io(_))),
            }
            match store.retrieve(&conv(1)) {
                Ok(lookup) => prop_assert_eq!(lookup, KeyLookup::Absent),
                Err(e) => prop_assert!(matches!(e, StorageError::Io(_))),
            }
        }
    });
}

#[test]
fn test_chaos_redb_backend() {
    let dir = tempdir().unwrap();
    let redb = RedbKeyStore::open(dir.path().join("keys.redb")).unwrap();
    let store = ChaoticKeyStore::with_seed(redb, 0.3, 7);
    let mut written = HashMap::new();

    for i in 0..40 {
        let key = ConversationKey::from_array([i as u8; KEY_SIZE]);
        if store.store(&conv(i), &key).is_ok() {
            written.insert(conv(i), key);
        }
    }

    assert!(!written.is_empty());
    verify_store(store.inner(), &written);
}
