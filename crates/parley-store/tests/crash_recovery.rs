//! Crash recovery tests for `RedbKeyStore`.
//!
//! These tests verify that keys persist across database close/reopen cycles,
//! simulating client restarts.

use parley_crypto::{ConversationKey, KEY_SIZE};
use parley_store::{ConversationId, KeyLookup, KeyStore, RedbKeyStore};
use tempfile::tempdir;

#[test]
fn test_keys_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("keys.redb");

    let count = 10u8;

    {
        let store = RedbKeyStore::open(&db_path).unwrap();

        for i in 0..count {
            let id = ConversationId::new(format!("conv-{i}")).unwrap();
            store.store(&id, &ConversationKey::from_array([i; KEY_SIZE])).unwrap();
        }

        // Database dropped
    }

    {
        let store = RedbKeyStore::open(&db_path).unwrap();

        assert_eq!(store.conversation_ids().unwrap().len(), count as usize);

        for i in 0..count {
            let id = ConversationId::new(format!("conv-{i}")).unwrap();
            assert_eq!(
                store.retrieve(&id).unwrap(),
                KeyLookup::Found(ConversationKey::from_array([i; KEY_SIZE]))
            );
        }
    }
}

#[test]
fn test_removal_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("keys.redb");
    let id = ConversationId::new("conv-42").unwrap();

    {
        let store = RedbKeyStore::open(&db_path).unwrap();
        store.store(&id, &ConversationKey::from_array([1; KEY_SIZE])).unwrap();
        assert!(store.remove(&id).unwrap());
    }

    {
        let store = RedbKeyStore::open(&db_path).unwrap();
        assert_eq!(store.retrieve(&id).unwrap(), KeyLookup::Absent);
    }
}

#[test]
fn test_overwrite_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("keys.redb");
    let id = ConversationId::new("conv-42").unwrap();

    {
        let store = RedbKeyStore::open(&db_path).unwrap();
        store.store(&id, &ConversationKey::from_array([1; KEY_SIZE])).unwrap();
        store.store(&id, &ConversationKey::from_array([2; KEY_SIZE])).unwrap();
    }

    {
        let store = RedbKeyStore::open(&db_path).unwrap();
        assert_eq!(
            store.retrieve(&id).unwrap(),
            KeyLookup::Found(ConversationKey::from_array([2; KEY_SIZE]))
        );
    }
}
