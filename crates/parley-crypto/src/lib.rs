//! Parley Cryptographic Primitives
//!
//! Building blocks for sealing chat messages under one symmetric key per
//! conversation. The byte-level functions are pure: callers provide the nonce
//! (or an [`Environment`] that produces it) so tests stay deterministic.
//!
//! # Key Lifecycle
//!
//! ```text
//! Environment::random_bytes
//!        │
//!        ▼
//! ConversationKey (32 bytes, one per conversation id, per device)
//!        │
//!        ▼  fresh 12-byte nonce per message
//! AES-256-GCM → ciphertext ‖ tag
//!        │
//!        ▼
//! Envelope: base64(nonce ‖ ciphertext ‖ tag)
//! ```
//!
//! Keys are generated once and reused for every message in a conversation.
//! Nothing here rotates or distributes them; a key never leaves the device
//! that created it.
//!
//! # Security
//!
//! Confidentiality:
//! - AES-256-GCM with a nonce drawn from the OS CSPRNG for every encryption
//! - Nonces are never derived from counters or message contents
//!
//! Authenticity:
//! - The GCM tag covers the whole ciphertext
//! - Tampering or a wrong key -> [`CipherError::AuthenticationFailure`]
//!
//! Hygiene:
//! - Key material is zeroized on drop and redacted from `Debug` output

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod env;
pub mod envelope;
pub mod error;
pub mod key;

pub use cipher::{decrypt, decrypt_bytes, encrypt, encrypt_bytes};
pub use env::{Environment, SystemEnv};
pub use envelope::{Envelope, NONCE_SIZE, TAG_SIZE};
pub use error::CipherError;
pub use key::{ConversationKey, KEY_SIZE};
