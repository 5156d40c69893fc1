//! HKDF-SHA256 derivation of wrapping keys from ECDH shared secrets.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::key::KEY_SIZE;
use crate::secret::Secret;

/// Salt/info label pair binding a derived key to one protocol use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdfContext {
    pub salt: &'static [u8],
    pub info: &'static [u8],
}

/// Labels for wrapping workspace keys. Changing either breaks every stored
/// envelope; a new purpose needs a new context.
pub const WORKSPACE_WRAP: KdfContext = KdfContext {
    salt: b"initflow.wrap",
    info: b"workspace",
};

/// Derives a 32-byte AEAD key from `shared_secret` under `context`.
pub fn derive_key(
    shared_secret: &[u8; 32],
    context: &KdfContext,
) -> CryptoResult<Secret<KEY_SIZE>> {
    let hk = Hkdf::<Sha256>::new(Some(context.salt), shared_secret);
    let mut okm = Secret::zeroed();
    hk.expand(context.info, okm.as_mut_bytes())
        .map_err(|_| CryptoError::DerivationFailed)?;
    Ok(okm)
}
