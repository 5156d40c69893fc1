//! Envelope encryption of workspace keys.
//!
//! A key is sealed for a recipient's X25519 public key with a single-use
//! ephemeral key pair:
//!
//! 1. `shared = X25519(ephemeral_secret, recipient_public)`
//! 2. `wrap_key = HKDF-SHA256(ikm = shared, salt = "initflow.wrap", info = "workspace")`
//! 3. `ciphertext = ChaCha20-Poly1305(wrap_key, random 12-byte nonce, plaintext)`
//!
//! The wire form is the flat concatenation
//!
//! ```text
//! [ ephemeral_public_key: 32 ][ nonce: 12 ][ ciphertext + tag: len + 16 ]
//! ```
//!
//! with no length prefix. A fresh wrap key is derived for every envelope, so a
//! random nonce is never reused under the same key. Do not reuse this layout
//! to encrypt several messages under one derived key.

use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{WORKSPACE_WRAP, derive_key};
use crate::key::{WorkspaceKey, X25519_KEY_SIZE, static_secret};
use crate::rng::Rng;

/// ChaCha20-Poly1305 nonce size.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size.
pub const TAG_SIZE: usize = 16;

/// Fixed prefix: ephemeral public key followed by the nonce.
pub const HEADER_SIZE: usize = X25519_KEY_SIZE + NONCE_SIZE;

/// A sealed workspace key, addressed to one recipient public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedEnvelope {
    /// Ephemeral X25519 public key (sender side of DH).
    pub ephemeral_public_key: [u8; X25519_KEY_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    /// ChaCha20-Poly1305 ciphertext with the 16-byte tag appended.
    pub ciphertext: Vec<u8>,
}

impl WrappedEnvelope {
    /// Length of the flat wire form.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.ciphertext.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Splits the flat wire form. Anything past the 44-byte header is taken
    /// as ciphertext; its authenticity is only checked by [`open`].
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CryptoError::MalformedEnvelope { len: bytes.len() });
        }

        let (ephemeral, rest) = bytes.split_at(X25519_KEY_SIZE);
        let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut ephemeral_public_key = [0u8; X25519_KEY_SIZE];
        ephemeral_public_key.copy_from_slice(ephemeral);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);

        Ok(Self {
            ephemeral_public_key,
            nonce: nonce_bytes,
            ciphertext: ciphertext.to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::Encoding(format!("invalid envelope encoding: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

/// Seals `plaintext` for `recipient`.
///
/// Rejects low-order recipient keys with [`CryptoError::InvalidPublicKey`].
/// The ephemeral secret, shared secret and wrap key are zeroized when they
/// go out of scope, on success and on every error path.
pub fn seal(rng: &Rng, plaintext: &[u8], recipient: &PublicKey) -> CryptoResult<WrappedEnvelope> {
    let ephemeral_bytes = Zeroizing::new(rng.random_array::<X25519_KEY_SIZE>()?);
    let ephemeral = static_secret(*ephemeral_bytes);
    let ephemeral_public = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(recipient);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidPublicKey);
    }

    let wrap_key = derive_key(shared.as_bytes(), &WORKSPACE_WRAP)?;
    let nonce: [u8; NONCE_SIZE] = rng.random_array()?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(wrap_key.as_bytes()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("envelope seal failed: {e}")))?;

    Ok(WrappedEnvelope {
        ephemeral_public_key: ephemeral_public.to_bytes(),
        nonce,
        ciphertext,
    })
}

/// Opens an envelope with the recipient's secret key.
///
/// Every failure caused by the envelope or the key (wrong recipient, flipped
/// bit, truncated tag, low-order or non-canonical ephemeral key) is reported as
/// [`CryptoError::AuthenticationFailed`].
pub fn open(
    envelope: &WrappedEnvelope,
    recipient_secret: &StaticSecret,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    // X25519 ignores the top bit of the u-coordinate; honest senders never set it.
    let canonical = envelope.ephemeral_public_key[X25519_KEY_SIZE - 1] & 0x80 == 0;
    let ephemeral_public = PublicKey::from(envelope.ephemeral_public_key);
    let shared = recipient_secret.diffie_hellman(&ephemeral_public);
    let contributory = shared.was_contributory();

    let wrap_key = derive_key(shared.as_bytes(), &WORKSPACE_WRAP)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(wrap_key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_ref())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    if !(canonical && contributory) {
        return Err(CryptoError::AuthenticationFailed);
    }
    Ok(plaintext)
}

/// Seals a workspace key for `recipient`.
pub fn seal_workspace_key(
    rng: &Rng,
    key: &WorkspaceKey,
    recipient: &PublicKey,
) -> CryptoResult<WrappedEnvelope> {
    seal(rng, key.as_bytes(), recipient)
}

/// Opens an envelope that must contain a 32-byte workspace key.
pub fn open_workspace_key(
    envelope: &WrappedEnvelope,
    recipient_secret: &StaticSecret,
) -> CryptoResult<WorkspaceKey> {
    let plaintext = open(envelope, recipient_secret)?;
    WorkspaceKey::try_from(plaintext.as_slice())
}
