//! Workspace key error types.

use thiserror::Error;

use crate::workspace_keys::InitStage;

/// Result type for backend, store and orchestration operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur while initializing or recovering workspace keys.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("local key store error: {0}")]
    Storage(String),

    #[error("device not registered")]
    DeviceNotRegistered,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] initflow_crypto::CryptoError),

    /// A workspace initialization step failed. `stage` tells the caller
    /// whether starting over is safe.
    #[error("workspace key initialization failed while {stage}: {source}")]
    StageFailed {
        stage: InitStage,
        #[source]
        source: Box<CloudError>,
    },

    /// The envelope reached the backend but the plaintext key was not stored
    /// locally. Recover with a fetch-and-open, never by sealing a new key.
    #[error("workspace key for {slug} uploaded but not stored locally: {reason}")]
    UploadedButNotStoredLocally { slug: String, reason: String },
}

impl CloudError {
    /// Initialization stage this error was raised in, if it came out of the
    /// workspace key flow. A local store failure after upload is the
    /// [`InitStage::Storing`] report.
    pub fn stage(&self) -> Option<InitStage> {
        match self {
            CloudError::StageFailed { stage, .. } => Some(*stage),
            CloudError::UploadedButNotStoredLocally { .. } => Some(InitStage::Storing),
            _ => None,
        }
    }

    pub(crate) fn at(stage: InitStage, source: CloudError) -> Self {
        CloudError::StageFailed {
            stage,
            source: Box::new(source),
        }
    }
}
