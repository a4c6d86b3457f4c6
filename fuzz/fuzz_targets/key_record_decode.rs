//! Fuzz target for stored key record decoding
//!
//! Feeds arbitrary bytes to `decode_key_record`, the path taken when a key
//! database has been damaged or tampered with.
//!
//! The fuzzer should NEVER panic. Anything that is not a valid record must
//! decode to `KeyLookup::Corrupt`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_store::{
    record::{decode_key_record, encode_key_record},
    KeyLookup,
};

fuzz_target!(|data: &[u8]| {
    match decode_key_record(data) {
        KeyLookup::Found(key) => {
            let reencoded = encode_key_record(&key).expect("encoding a valid key cannot fail");
            assert_eq!(decode_key_record(&reencoded), KeyLookup::Found(key));
        },
        KeyLookup::Corrupt { .. } => {},
        KeyLookup::Absent => panic!("decoder must never report absence"),
    }
});
