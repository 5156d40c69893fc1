//! Envelope encryption for InitFlow workspace keys.
//!
//! A device generates a 256-bit workspace key and seals it to an X25519
//! public key so the backend can store and redistribute it without ever
//! seeing the plaintext.
//!
//! - X25519 ephemeral-static key agreement
//! - HKDF-SHA256 with fixed domain-separation labels
//! - ChaCha20-Poly1305 for authenticated encryption
//! - Zeroization of every secret intermediate
//!
//! # Architecture
//!
//! 1. **Workspace Key**: 32 random bytes drawn from [`Rng`]. Generated once
//!    per workspace by the initializing device.
//!
//! 2. **Device Key Pair**: a long-term X25519 pair. Key material is always
//!    passed in explicitly; nothing here reads from ambient storage.
//!
//! 3. **Wrapped Envelope**: the workspace key sealed for one recipient public
//!    key, serialized as `ephemeral_pk(32) || nonce(12) || ciphertext+tag`.
//!
//! Sealing to an arbitrary recipient is the general primitive; sealing to the
//! device's own public key during initialization is just one use of it.

pub mod envelope;
mod error;
pub mod kdf;
mod key;
mod rng;
mod secret;

pub use envelope::{
    HEADER_SIZE, NONCE_SIZE, TAG_SIZE, WrappedEnvelope, open, open_workspace_key, seal,
    seal_workspace_key,
};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{KdfContext, WORKSPACE_WRAP, derive_key};
pub use key::{
    DeviceKeyPair, KEY_SIZE, WorkspaceKey, X25519_KEY_SIZE, generate_workspace_key,
    public_key_fingerprint,
};
pub use rng::Rng;
pub use secret::Secret;

pub use x25519_dalek::{PublicKey, StaticSecret};
