//! Workspace keys and device key pairs.

use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{CryptoError, CryptoResult};
use crate::rng::Rng;
use crate::secret::Secret;

/// Size of a workspace key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of an X25519 public or private key in bytes.
pub const X25519_KEY_SIZE: usize = 32;

/// A workspace's symmetric secret-encryption key.
///
/// Created once per workspace by the initializing device. Zeroized on drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceKey(Secret<KEY_SIZE>);

impl WorkspaceKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(Secret::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }
}

impl TryFrom<&[u8]> for WorkspaceKey {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut secret = Secret::zeroed();
        secret.as_mut_bytes().copy_from_slice(bytes);
        Ok(Self(secret))
    }
}

/// Generates a fresh 256-bit workspace key.
///
/// Draws exactly [`KEY_SIZE`] bytes from `rng`; never derived from other
/// key material.
pub fn generate_workspace_key(rng: &Rng) -> CryptoResult<WorkspaceKey> {
    let mut secret = Secret::zeroed();
    rng.fill(secret.as_mut_bytes())?;
    Ok(WorkspaceKey(secret))
}

/// Builds an X25519 secret and wipes the array it was handed.
///
/// `StaticSecret` only takes its bytes by value, so the caller's copy ends up
/// here and is cleared once the secret owns its own.
pub(crate) fn static_secret(mut bytes: [u8; X25519_KEY_SIZE]) -> StaticSecret {
    let secret = StaticSecret::from(bytes);
    bytes.zeroize();
    secret
}

/// Long-term X25519 key pair identifying a device.
///
/// The secret half implements `ZeroizeOnDrop` (from x25519-dalek).
pub struct DeviceKeyPair {
    pub secret: StaticSecret,
    pub public: PublicKey,
}

impl DeviceKeyPair {
    pub fn generate(rng: &Rng) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(rng.random_array::<X25519_KEY_SIZE>()?);
        Ok(Self::from_secret_bytes(*bytes))
    }

    /// Reconstructs a key pair from raw secret key bytes. The passed array is
    /// wiped.
    pub fn from_secret_bytes(bytes: [u8; X25519_KEY_SIZE]) -> Self {
        let secret = static_secret(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        self.public.to_bytes()
    }

    pub fn secret_bytes(&self) -> Zeroizing<[u8; X25519_KEY_SIZE]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Lowercase hex SHA-256 of the public key.
    pub fn fingerprint(&self) -> String {
        public_key_fingerprint(&self.public_bytes())
    }
}

impl std::fmt::Debug for DeviceKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceKeyPair")
            .field("public", &hex::encode(self.public.as_bytes()))
            .field("secret", &"***")
            .finish()
    }
}

pub fn public_key_fingerprint(public_key: &[u8; X25519_KEY_SIZE]) -> String {
    hex::encode(Sha256::digest(public_key))
}
