//! Crypto error types.

use thiserror::Error;

/// Result type for envelope and key operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors produced by the envelope-encryption core.
///
/// Every variant is fatal for the call that produced it. None of them are
/// retried internally with weaker parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The entropy source could not supply random bytes.
    #[error("secure randomness unavailable")]
    RandomnessUnavailable,

    /// The recipient public key is a low-order point (all-zero shared secret).
    #[error("invalid public key: degenerate X25519 point")]
    InvalidPublicKey,

    #[error("key derivation failed")]
    DerivationFailed,

    /// Tag verification failed. Deliberately carries no detail: a wrong key,
    /// a tampered byte and a truncated tag all look the same.
    #[error("envelope authentication failed")]
    AuthenticationFailed,

    #[error("malformed envelope: {len} bytes is shorter than the 44-byte header")]
    MalformedEnvelope { len: usize },

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}
